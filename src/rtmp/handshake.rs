// RTMP handshake utils

use rand::{rngs::StdRng, RngCore, SeedableRng};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::RtmpError;

use super::{RTMP_SIG_SIZE, RTMP_VERSION};

/// Performs the server side of the RTMP handshake (simple variant, no digest)
///
/// Reads C0/C1 from `read_stream`, writes S0/S1/S2 to `write_stream` and reads back C2.
///
/// # Arguments
///
/// * `read_stream` - The stream to read from the client
/// * `write_stream` - The stream to write to the client
/// * `strict` - If true, C2 must echo S1 exactly. If false, any C2 of the correct length
///   is accepted (compatibility with clients that don't echo S1 verbatim)
///
/// Returns `Ok(())` once the handshake has completed and the connection is ready to be
/// treated as a plain chunk stream.
pub async fn perform_handshake<TR: AsyncRead + AsyncReadExt + Unpin, TW: AsyncWrite + AsyncWriteExt + Unpin>(
    read_stream: &mut TR,
    write_stream: &mut TW,
    strict: bool,
) -> Result<(), RtmpError> {
    // C0: version byte
    let mut c0 = [0u8; 1];
    read_stream.read_exact(&mut c0).await?;

    if c0[0] != RTMP_VERSION {
        return Err(RtmpError::UnsupportedVersion(c0[0]));
    }

    // C1: 1536 bytes
    let mut c1 = vec![0u8; RTMP_SIG_SIZE];
    read_stream.read_exact(&mut c1).await?;

    let s1 = generate_s1();

    // S0 + S1 + S2 (S2 is the client's C1 echoed verbatim)
    let mut response: Vec<u8> = Vec::with_capacity(1 + RTMP_SIG_SIZE * 2);
    response.push(RTMP_VERSION);
    response.extend_from_slice(&s1);
    response.extend_from_slice(&c1);

    write_stream.write_all(&response).await?;
    write_stream.flush().await?;

    // C2: 1536 bytes, expected to echo S1
    let mut c2 = vec![0u8; RTMP_SIG_SIZE];
    read_stream.read_exact(&mut c2).await?;

    if strict && c2 != s1 {
        return Err(RtmpError::HandshakeMismatch);
    }

    Ok(())
}

/// Generates S1: 4 bytes timestamp, 4 bytes zero, 1528 bytes random
fn generate_s1() -> Vec<u8> {
    let mut s1 = vec![0u8; RTMP_SIG_SIZE];

    // Timestamp left at zero; peers do not rely on it for the simple handshake
    s1[0] = 0;
    s1[1] = 0;
    s1[2] = 0;
    s1[3] = 0;

    // 4 bytes zero (bytes 4..8 are already zero)

    let mut rng = StdRng::from_os_rng();
    rng.fill_bytes(&mut s1[8..]);

    s1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_c0_c1() -> Vec<u8> {
        let mut c = vec![RTMP_VERSION];
        c.extend(vec![0u8; RTMP_SIG_SIZE]);
        c
    }

    #[tokio::test]
    async fn test_lenient_handshake_accepts_any_c2_of_correct_length() {
        let mut input = make_c0_c1();
        input.extend(vec![0xaa; RTMP_SIG_SIZE]); // C2 that does not echo S1

        let mut read_stream: &[u8] = &input;
        let mut write_stream: Vec<u8> = Vec::new();

        let result = perform_handshake(&mut read_stream, &mut write_stream, false).await;
        assert!(result.is_ok());

        // S0 + S1 + S2
        assert_eq!(write_stream.len(), 1 + RTMP_SIG_SIZE * 2);
        assert_eq!(write_stream[0], RTMP_VERSION);
    }

    #[tokio::test]
    async fn test_strict_handshake_rejects_mismatched_c2() {
        let mut input = make_c0_c1();
        input.extend(vec![0xaa; RTMP_SIG_SIZE]); // Does not echo the generated S1

        let mut read_stream: &[u8] = &input;
        let mut write_stream: Vec<u8> = Vec::new();

        let result = perform_handshake(&mut read_stream, &mut write_stream, true).await;
        assert!(matches!(result, Err(RtmpError::HandshakeMismatch)));
    }

    #[tokio::test]
    async fn test_strict_handshake_accepts_echoed_s1() {
        // Drive a single handshake over a real duplex pipe so the client side can
        // observe the S1 this handshake actually generated and echo it back as C2,
        // rather than capturing S1 from one call and feeding it to an unrelated one.
        let (server_side, mut client_side) = tokio::io::duplex(4096);
        let (mut server_read, mut server_write) = tokio::io::split(server_side);

        let server_task = tokio::spawn(async move {
            perform_handshake(&mut server_read, &mut server_write, true).await
        });

        client_side.write_all(&make_c0_c1()).await.unwrap();
        client_side.flush().await.unwrap();

        let mut s0 = [0u8; 1];
        client_side.read_exact(&mut s0).await.unwrap();
        assert_eq!(s0[0], RTMP_VERSION);

        let mut s1 = vec![0u8; RTMP_SIG_SIZE];
        client_side.read_exact(&mut s1).await.unwrap();

        let mut s2 = vec![0u8; RTMP_SIG_SIZE];
        client_side.read_exact(&mut s2).await.unwrap();

        // C2 echoes the S1 this handshake produced
        client_side.write_all(&s1).await.unwrap();
        client_side.flush().await.unwrap();

        let result = server_task.await.unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_version_is_rejected() {
        let mut input = vec![9u8]; // Not RTMP_VERSION
        input.extend(vec![0u8; RTMP_SIG_SIZE]);
        input.extend(vec![0u8; RTMP_SIG_SIZE]);

        let mut read_stream: &[u8] = &input;
        let mut write_stream: Vec<u8> = Vec::new();

        let result = perform_handshake(&mut read_stream, &mut write_stream, true).await;
        assert!(matches!(result, Err(RtmpError::UnsupportedVersion(9))));
    }
}
