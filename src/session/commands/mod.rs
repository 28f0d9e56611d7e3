// Command handling logic

mod close_stream;
mod connect;
mod create_stream;
mod delete_stream;
mod pause;
mod play;
mod publish;
mod receive;

pub use close_stream::*;
pub use connect::*;
pub use create_stream::*;
pub use delete_stream::*;
pub use pause::*;
pub use play::*;
pub use publish::*;
pub use receive::*;
