use crate::common::{Channel, Reader, Writer, CHANNEL_CAPACITY};

use std::collections::HashMap;
use std::io::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use log::{error, trace, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{
        mpsc::{channel, Receiver, Sender},
        Mutex,
    },
};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Reply queues of the open connections. A connection removes itself when
/// its task ends.
type Connections = Arc<Mutex<HashMap<SocketAddr, Sender<Bytes>>>>;

/// Incoming side of the framed TCP transport.
///
/// Frames from every accepted connection come out of the returned receiver
/// tagged with the remote address; sending `(addr, frame)` into the returned
/// sender writes the frame back on that connection. Dropping the sender
/// stops the accept loop.
pub struct Server {
    listener: TcpListener,
    inbound: Sender<(SocketAddr, Bytes)>,
    replies: Receiver<(SocketAddr, Bytes)>,
    connections: Connections,
}

impl Server {
    pub async fn spawn(host_addr: SocketAddr) -> Result<(SocketAddr, Channel), Error> {
        let (server, local_addr, handle) = Self::bind(host_addr).await?;
        tokio::spawn(server.run());
        Ok((local_addr, handle))
    }

    async fn bind(host_addr: SocketAddr) -> Result<(Self, SocketAddr, Channel), Error> {
        let listener = TcpListener::bind(host_addr).await?;
        let local_addr = listener.local_addr()?;
        let (inbound, frames) = channel(CHANNEL_CAPACITY);
        let (reply_sender, replies) = channel(CHANNEL_CAPACITY);
        let server = Self {
            listener,
            inbound,
            replies,
            connections: Default::default(),
        };
        Ok((server, local_addr, (reply_sender, frames)))
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((socket, addr)) => self.accept(socket, addr).await,
                    Err(e) => error!("couldn't get client: {e:?}"),
                },
                reply = self.replies.recv() => {
                    let Some((addr, frame)) = reply else {
                        trace!("server handle dropped, stop accepting");
                        return;
                    };
                    self.reply(addr, frame).await;
                }
            }
        }
    }

    async fn accept(&self, socket: TcpStream, addr: SocketAddr) {
        trace!("accept connection from {}", addr);
        let (reply_sender, replies) = channel(CHANNEL_CAPACITY);
        self.connections.lock().await.insert(addr, reply_sender);

        let (writer, reader) = Framed::new(socket, LengthDelimitedCodec::new()).split();
        let connection = Connection {
            remote_addr: addr,
            inbound: self.inbound.clone(),
            replies,
            reader,
            writer,
        };
        let connections = self.connections.clone();
        tokio::spawn(async move {
            connection.run().await;
            connections.lock().await.remove(&addr);
            trace!("forgot connection {}", addr);
        });
    }

    async fn reply(&self, addr: SocketAddr, frame: Bytes) {
        let reply_sender = self.connections.lock().await.get(&addr).cloned();
        match reply_sender {
            Some(reply_sender) => {
                if reply_sender.send(frame).await.is_err() {
                    warn!("{} hung up before the reply", addr);
                }
            }
            None => warn!("No connection from {}", addr),
        }
    }
}

/// One accepted socket: forwards its frames inbound and writes replies
/// back until either side gives up.
struct Connection {
    remote_addr: SocketAddr,
    inbound: Sender<(SocketAddr, Bytes)>,
    replies: Receiver<Bytes>,
    reader: Reader,
    writer: Writer,
}

impl Connection {
    async fn run(mut self) {
        loop {
            tokio::select! {
                frame = self.reader.next() => match frame {
                    Some(Ok(data)) => {
                        trace!("received msg from: {}", self.remote_addr);
                        if self.inbound.send((self.remote_addr, data.freeze())).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        error!("bad frame from {}: {}", self.remote_addr, e);
                        return;
                    }
                    None => {
                        trace!("{} hung up", self.remote_addr);
                        return;
                    }
                },
                Some(data) = self.replies.recv() => {
                    trace!("sending msg to {}", self.remote_addr);
                    if let Err(e) = self.writer.send(data).await {
                        warn!("Disconnected from {}: {}", self.remote_addr, e);
                        return;
                    }
                }
            }
        }
    }
}
