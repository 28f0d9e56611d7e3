// AMF3 value

use byteorder::{BigEndian, ByteOrder};

use super::decode::{AmfError, AMFDecodingCursor};

const AMF3_TYPE_UNDEFINED: u8 = 0x00;
const AMF3_TYPE_NULL: u8 = 0x01;
const AMF3_TYPE_FALSE: u8 = 0x02;
const AMF3_TYPE_TRUE: u8 = 0x03;
const AMF3_TYPE_INTEGER: u8 = 0x04;
const AMF3_TYPE_DOUBLE: u8 = 0x05;
const AMF3_TYPE_STRING: u8 = 0x06;
const AMF3_TYPE_XML_DOC: u8 = 0x07;
const AMF3_TYPE_DATE: u8 = 0x08;
const AMF3_TYPE_ARRAY: u8 = 0x09;
const AMF3_TYPE_OBJECT: u8 = 0x0A;
const AMF3_TYPE_XML: u8 = 0x0B;
const AMF3_TYPE_BYTE_ARRAY: u8 = 0x0C;

/// AMF3 compatible value
pub enum AMF3Value {
    Undefined,
    Null,
    False,
    True,
    Integer { value: i32 },
    Double { value: f64 },
    String { value: String },
    XmlDocument { content: String },
    Date { timestamp: f64 },
    Array,
    Object,
    Xml { value: String },
    ByteArray { value: Vec<u8> },
}

impl AMF3Value {
    /// Obtains a string representation of the value
    /// Used for debug logging purposes
    pub fn to_debug_string(&self, tabs: &str) -> String {
        match self {
            AMF3Value::Undefined => "Undefined".to_string(),
            AMF3Value::Null => "Null".to_string(),
            AMF3Value::False => "False".to_string(),
            AMF3Value::True => "True".to_string(),
            AMF3Value::Integer { value } => format!("Integer({})", value),
            AMF3Value::Double { value } => format!("Double({})", value),
            AMF3Value::String { value } => format!("'{}'", value),
            AMF3Value::XmlDocument { content } => format!("XML_DOC'{}'", content),
            AMF3Value::Date { timestamp } => format!("DATE({})", timestamp),
            AMF3Value::Array => "Array(Unsupported)".to_string(),
            AMF3Value::Object => "Object(Unsupported)".to_string(),
            AMF3Value::Xml { value } => format!("XML'{}'", value),
            AMF3Value::ByteArray { value } => format!("Bytes({})", hex::encode(value)),
        }
    }

    /// Turns the ANF3 value into a boolean
    pub fn get_bool(&self) -> bool {
        match self {
            AMF3Value::True => true,
            _ => false,
        }
    }

    /// Returns true if the value is undefined
    pub fn is_undefined(&self) -> bool {
        match self {
            AMF3Value::Undefined => true,
            _ => false,
        }
    }

    /// Returns true if the value is null
    pub fn is_null(&self) -> bool {
        match self {
            AMF3Value::Null => true,
            _ => false,
        }
    }

    /// Returns the value as integer
    pub fn get_integer(&self) -> i64 {
        match self {
            AMF3Value::Integer { value } => *value as i64,
            AMF3Value::Double { value } => *value as i64,
            _ => 0,
        }
    }

    /// Returns the value as float
    pub fn get_float(&self) -> f64 {
        match self {
            AMF3Value::Integer { value } => *value as f64,
            AMF3Value::Double { value } => *value,
            _ => 0.0,
        }
    }

    /// Returns the value as string
    pub fn get_string(&self) -> &str {
        match self {
            AMF3Value::String { value } => value.as_str(),
            AMF3Value::XmlDocument { content } => content.as_str(),
            AMF3Value::Xml { value } => value.as_str(),
            _ => "",
        }
    }

    /// Returns the value as string
    pub fn get_byte_array(&self) -> Option<&Vec<u8>> {
        match self {
            AMF3Value::ByteArray { value } => Some(value),
            _ => None,
        }
    }

    /// Encodes the value into bytes, including its marker byte
    ///
    /// Array and Object values are not supported for encoding, since they
    /// are not produced by any command or data message this endpoint sends.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            AMF3Value::Undefined => vec![AMF3_TYPE_UNDEFINED],
            AMF3Value::Null => vec![AMF3_TYPE_NULL],
            AMF3Value::False => vec![AMF3_TYPE_FALSE],
            AMF3Value::True => vec![AMF3_TYPE_TRUE],
            AMF3Value::Integer { value } => {
                let mut buf = vec![AMF3_TYPE_INTEGER];
                buf.extend(Self::encode_u29((*value as u32) & 0x1FFFFFFF));
                buf
            }
            AMF3Value::Double { value } => {
                let mut buf = vec![AMF3_TYPE_DOUBLE];
                let mut num_buf = vec![0u8; 8];
                BigEndian::write_f64(&mut num_buf, *value);
                buf.extend(num_buf);
                buf
            }
            AMF3Value::String { value } => {
                let mut buf = vec![AMF3_TYPE_STRING];
                buf.extend(Self::encode_utf8_literal(value));
                buf
            }
            AMF3Value::XmlDocument { content } => {
                let mut buf = vec![AMF3_TYPE_XML_DOC];
                buf.extend(Self::encode_utf8_literal(content));
                buf
            }
            AMF3Value::Date { timestamp } => {
                let mut buf = vec![AMF3_TYPE_DATE];
                buf.extend(Self::encode_u29(1)); // literal marker (odd value, no ref table)
                let mut num_buf = vec![0u8; 8];
                BigEndian::write_f64(&mut num_buf, *timestamp);
                buf.extend(num_buf);
                buf
            }
            AMF3Value::Array | AMF3Value::Object => vec![AMF3_TYPE_UNDEFINED],
            AMF3Value::Xml { value } => {
                let mut buf = vec![AMF3_TYPE_XML];
                buf.extend(Self::encode_utf8_literal(value));
                buf
            }
            AMF3Value::ByteArray { value } => {
                let mut buf = vec![AMF3_TYPE_BYTE_ARRAY];
                buf.extend(Self::encode_u29(((value.len() as u32) << 1) | 0x01));
                buf.extend(value);
                buf
            }
        }
    }

    /// Computes the encoded size in bytes of a value, including its marker byte
    pub fn size(&self) -> usize {
        self.encode().len()
    }

    fn encode_u29(value: u32) -> Vec<u8> {
        let value = value & 0x1FFFFFFF;

        if value < 0x80 {
            vec![value as u8]
        } else if value < 0x4000 {
            vec![((value >> 7) | 0x80) as u8, (value & 0x7F) as u8]
        } else if value < 0x200000 {
            vec![
                ((value >> 14) | 0x80) as u8,
                (((value >> 7) & 0x7F) | 0x80) as u8,
                (value & 0x7F) as u8,
            ]
        } else {
            vec![
                ((value >> 22) | 0x80) as u8,
                (((value >> 15) & 0x7F) | 0x80) as u8,
                (((value >> 8) & 0x7F) | 0x80) as u8,
                (value & 0xFF) as u8,
            ]
        }
    }

    fn encode_utf8_literal(s: &str) -> Vec<u8> {
        let bytes = s.as_bytes();
        let mut buf = Self::encode_u29(((bytes.len() as u32) << 1) | 0x01);
        buf.extend(bytes);
        buf
    }

    /// Reads a value from a buffer, advancing the cursor past it
    ///
    /// References into the AMF3 string/object table are not supported: this
    /// endpoint only needs to read command arguments, which are always
    /// encoded as literals by well-behaved clients.
    pub fn read(cursor: &mut AMFDecodingCursor, buffer: &[u8]) -> Result<AMF3Value, AmfError> {
        let marker = cursor.read(buffer, 1)?[0];

        match marker {
            AMF3_TYPE_UNDEFINED => Ok(AMF3Value::Undefined),
            AMF3_TYPE_NULL => Ok(AMF3Value::Null),
            AMF3_TYPE_FALSE => Ok(AMF3Value::False),
            AMF3_TYPE_TRUE => Ok(AMF3Value::True),
            AMF3_TYPE_INTEGER => {
                let raw = Self::read_u29(cursor, buffer)?;
                let value = if raw >= 0x10000000 {
                    (raw as i32) - 0x20000000
                } else {
                    raw as i32
                };
                Ok(AMF3Value::Integer { value })
            }
            AMF3_TYPE_DOUBLE => {
                let bytes = cursor.read(buffer, 8)?;
                Ok(AMF3Value::Double {
                    value: BigEndian::read_f64(bytes),
                })
            }
            AMF3_TYPE_STRING => Ok(AMF3Value::String {
                value: Self::read_utf8_literal(cursor, buffer)?,
            }),
            AMF3_TYPE_XML_DOC => Ok(AMF3Value::XmlDocument {
                content: Self::read_utf8_literal(cursor, buffer)?,
            }),
            AMF3_TYPE_DATE => {
                let header = Self::read_u29(cursor, buffer)?;
                if header & 0x01 == 0 {
                    return Err(AmfError::Truncated); // reference, unsupported
                }
                let bytes = cursor.read(buffer, 8)?;
                Ok(AMF3Value::Date {
                    timestamp: BigEndian::read_f64(bytes),
                })
            }
            AMF3_TYPE_XML => Ok(AMF3Value::Xml {
                value: Self::read_utf8_literal(cursor, buffer)?,
            }),
            AMF3_TYPE_BYTE_ARRAY => {
                let header = Self::read_u29(cursor, buffer)?;
                if header & 0x01 == 0 {
                    return Err(AmfError::Truncated); // reference, unsupported
                }
                let len = (header >> 1) as usize;
                let bytes = cursor.read(buffer, len)?;
                Ok(AMF3Value::ByteArray {
                    value: bytes.to_vec(),
                })
            }
            AMF3_TYPE_ARRAY | AMF3_TYPE_OBJECT => Err(AmfError::Truncated),
            marker => Err(AmfError::UnknownType(marker)),
        }
    }

    fn read_u29(cursor: &mut AMFDecodingCursor, buffer: &[u8]) -> Result<u32, AmfError> {
        let mut result: u32 = 0;

        for i in 0..4 {
            let byte = cursor.read(buffer, 1)?[0];

            if i == 3 {
                result = (result << 8) | (byte as u32);
                break;
            }

            result = (result << 7) | ((byte & 0x7F) as u32);

            if byte & 0x80 == 0 {
                break;
            }
        }

        Ok(result)
    }

    fn read_utf8_literal(cursor: &mut AMFDecodingCursor, buffer: &[u8]) -> Result<String, AmfError> {
        let header = Self::read_u29(cursor, buffer)?;

        if header & 0x01 == 0 {
            return Err(AmfError::Truncated); // reference, unsupported
        }

        let len = (header >> 1) as usize;
        let bytes = cursor.read(buffer, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AmfError::Truncated)
    }
}
