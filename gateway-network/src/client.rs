use crate::common::{Reader, CHANNEL_CAPACITY};

use std::io::{Error, ErrorKind};
use std::net::SocketAddr;
use std::result::Result;
use std::time::Duration;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use log::{trace, warn};
use tokio::{
    net::TcpStream,
    sync::mpsc::{channel, Receiver, Sender},
    time,
};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

const INITIAL_DELAY_MS: u64 = 200;
const MAX_DELAY_MS: u64 = 60_000;

/// Outgoing side of the framed TCP transport.
///
/// Every call opens its own connection, so one `Client` can be shared by any
/// number of concurrent requests.
#[derive(Clone, Debug)]
pub struct Client {
    retries: u32,
}

impl Client {
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Sends one frame and waits for exactly one frame back.
    pub async fn request(&self, remote_addr: SocketAddr, data: Bytes) -> Result<Bytes, Error> {
        let (mut writer, mut reader) = self.connect(remote_addr).await?.split();
        trace!("send request to {}", remote_addr);
        writer.send(data).await?;
        match reader.next().await {
            Some(frame) => Ok(frame?.freeze()),
            None => Err(Error::new(
                ErrorKind::UnexpectedEof,
                format!("{} closed the connection before replying", remote_addr),
            )),
        }
    }

    /// Sends one frame and forwards every frame received afterwards until
    /// either side hangs up. Dropping the receiver closes the connection.
    pub async fn subscribe(
        &self,
        remote_addr: SocketAddr,
        data: Bytes,
    ) -> Result<Receiver<Bytes>, Error> {
        let (mut writer, reader) = self.connect(remote_addr).await?.split();
        trace!("send subscription to {}", remote_addr);
        writer.send(data).await?;
        let (sender, receiver) = channel(CHANNEL_CAPACITY);
        Subscription::spawn(remote_addr, reader, sender);
        Ok(receiver)
    }

    async fn connect(
        &self,
        remote_addr: SocketAddr,
    ) -> Result<Framed<TcpStream, LengthDelimitedCodec>, Error> {
        let mut delay = INITIAL_DELAY_MS;
        let mut retry = 0;
        loop {
            match TcpStream::connect(remote_addr).await {
                Ok(stream) => {
                    trace!("Outgoing connection established with {}", remote_addr);
                    return Ok(Framed::new(stream, LengthDelimitedCodec::new()));
                }
                Err(e) if retry < self.retries => {
                    warn!(
                        "connect to {}, retry {} times, reason {}",
                        remote_addr, retry, e
                    );
                    // Wait an increasing delay before attempting to reconnect.
                    time::sleep(Duration::from_millis(delay)).await;
                    delay = std::cmp::min(2 * delay, MAX_DELAY_MS);
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

struct Subscription {
    remote_addr: SocketAddr,
    reader: Reader,
    sender: Sender<Bytes>,
}

impl Subscription {
    fn spawn(remote_addr: SocketAddr, reader: Reader, sender: Sender<Bytes>) {
        tokio::spawn(async move {
            Self {
                remote_addr,
                reader,
                sender,
            }
            .run()
            .await
        });
    }

    async fn run(&mut self) {
        loop {
            tokio::select! {
                frame = self.reader.next() => match frame {
                    Some(Ok(data)) => {
                        trace!("received frame from {}", self.remote_addr);
                        if self.sender.send(data.freeze()).await.is_err() {
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        warn!("subscription to {} broken: {}", self.remote_addr, e);
                        return;
                    }
                    None => {
                        trace!("{} closed the subscription", self.remote_addr);
                        return;
                    }
                },
                _ = self.sender.closed() => {
                    trace!("subscriber to {} went away", self.remote_addr);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod client_test {
    use super::*;
    use crate::server::Server;

    use tokio::net::TcpListener;

    #[tokio::test]
    async fn request_gets_one_reply() {
        let (addr, (sender, mut receiver)) =
            Server::spawn("127.0.0.1:0".parse().unwrap()).await.unwrap();
        tokio::spawn(async move {
            while let Some((from, data)) = receiver.recv().await {
                let mut reply = b"echo:".to_vec();
                reply.extend_from_slice(&data);
                sender.send((from, reply.into())).await.unwrap();
            }
        });

        let client = Client::new(0);
        let reply = client
            .request(addr, Bytes::from_static(b"ping"))
            .await
            .unwrap();
        assert_eq!(reply.as_ref(), b"echo:ping");
    }

    #[tokio::test]
    async fn subscription_forwards_frames() {
        let (addr, (sender, mut receiver)) =
            Server::spawn("127.0.0.1:0".parse().unwrap()).await.unwrap();
        tokio::spawn(async move {
            if let Some((from, _)) = receiver.recv().await {
                sender.send((from, Bytes::from_static(b"one"))).await.unwrap();
                sender.send((from, Bytes::from_static(b"two"))).await.unwrap();
            }
            // Keep the server side alive until the test finishes.
            let _ = receiver.recv().await;
        });

        let client = Client::new(0);
        let mut frames = client
            .subscribe(addr, Bytes::from_static(b"sub"))
            .await
            .unwrap();
        assert_eq!(frames.recv().await.unwrap().as_ref(), b"one");
        assert_eq!(frames.recv().await.unwrap().as_ref(), b"two");
    }

    #[tokio::test]
    async fn dropped_subscription_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let client = Client::new(0);
        let frames = client
            .subscribe(addr, Bytes::from_static(b"sub"))
            .await
            .unwrap();
        let (socket, _) = listener.accept().await.unwrap();
        let mut remote = Framed::new(socket, LengthDelimitedCodec::new());
        assert_eq!(remote.next().await.unwrap().unwrap().as_ref(), b"sub");

        // The remote never answers; only dropping the receiver ends it.
        drop(frames);
        let hangup = time::timeout(Duration::from_secs(2), remote.next())
            .await
            .unwrap();
        assert!(hangup.is_none());
    }

    #[tokio::test]
    async fn connect_gives_up_after_retries() {
        // Bind and drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(1);
        assert!(client.request(addr, Bytes::new()).await.is_err());
    }
}
