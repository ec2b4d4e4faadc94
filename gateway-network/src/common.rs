use std::net::SocketAddr;

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use tokio::{
    net::TcpStream,
    sync::mpsc::{Receiver, Sender},
};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Convenient alias for the writer end of the TCP channel.
pub type Writer = SplitSink<Framed<TcpStream, LengthDelimitedCodec>, Bytes>;
pub type Reader = SplitStream<Framed<TcpStream, LengthDelimitedCodec>>;
/// Frames tagged with the remote address they came from or go to.
pub type Channel = (Sender<(SocketAddr, Bytes)>, Receiver<(SocketAddr, Bytes)>);

pub const CHANNEL_CAPACITY: usize = 1000;
