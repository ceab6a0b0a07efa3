use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::net::SocketAddrV4;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;
use adnl_tcp::client::{AdnlTcpClient, ServerKey};
use futures::{ready, SinkExt, StreamExt};
use pin_project::pin_project;
use rand::random;
use thiserror::Error;
use tokio::select;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use adnl_tcp::packet::Packet;
use adnl_tcp::ping::{is_pong_packet, ping_packet};
use adnl_tcp::deserializer::{from_bytes_boxed, Deserialize, Deserializer, DeserializerError};
use adnl_tcp::serializer::to_bytes_boxed;
use adnl_tcp::types::BareType;
use crate::request::Requestable;
use crate::tl::{AdnlMessageAnswer, AdnlMessageQuery, Bytes, Int256, LiteServerError, LiteServerQuery};

pub type RequestId = Int256;

const PING_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum Error {
    #[error("LiteServer error: {0}")]
    LiteServerError(#[from] LiteServerError),
    #[error("Deserialize error: {0}")]
    Deserialize(#[from] DeserializerError),
    #[error("Inner channel is closed")]
    ChannelClosed,
    #[error("Response oneshot channel is closed")]
    OneshotClosed,
    #[error("No available liteservers")]
    NoAvailableClients,
}

#[derive(Debug, Clone)]
pub struct LiteServerClient {
    tx: mpsc::UnboundedSender<ClientActorMessage>,
    drop_guard: Arc<DropGuard>,
}

struct ClientActor {
    connection: AdnlTcpClient,
    receiver: mpsc::UnboundedReceiver<ClientActorMessage>,
    cancellation_token: CancellationToken
}

impl ClientActor {
    pub fn new(connection: AdnlTcpClient, receiver: mpsc::UnboundedReceiver<ClientActorMessage>, cancellation_token: CancellationToken) -> Self {
        Self { connection, receiver, cancellation_token }
    }

    pub fn run(mut self) {
        tokio::spawn(async move {
            let mut responses: HashMap<RequestId, oneshot::Sender<Bytes>> = Default::default();

            let mut interval = tokio::time::interval(PING_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            let stream = UnboundedReceiverStream::new(self.receiver);
            let mut stream = tokio_stream::StreamExt::timeout_repeating(stream, interval);

            loop {
                select! {
                    _ = self.cancellation_token.cancelled() => {
                        tracing::debug!("LiteServerClient cancelled");
                        break;
                    },
                    response = self.connection.next() => {
                        match response {
                            Some(Ok(packet)) if is_pong_packet(&packet) => {
                                tracing::trace!("pong packet received");
                            },
                            Some(Ok(packet)) => {
                                let adnl_answer = match from_bytes_boxed::<AdnlMessageAnswer>(&packet.data) {
                                    Ok(answer) => answer,
                                    Err(error) => {
                                        tracing::warn!(error = ?error, "unexpected packet");
                                        continue;
                                    }
                                };

                                let Some(oneshot) = responses.remove(&adnl_answer.query_id) else {
                                    tracing::trace!(query_id = %hex::encode(adnl_answer.query_id), "answer for unknown query");
                                    continue;
                                };

                                if oneshot.send(adnl_answer.answer).is_err() {
                                    tracing::trace!("response receiver dropped");
                                }
                            }
                            Some(Err(error)) => {
                                tracing::error!(error = ?error, "reading error");
                                break;
                            }
                            None => {
                                tracing::error!("connection closed");
                                break;
                            }
                        }
                    },
                    Some(request) = stream.next() => {
                        let result = match request {
                            Ok(ClientActorMessage::Query { query, oneshot }) => {
                                responses.insert(query.query_id, oneshot);

                                let data = to_bytes_boxed(&query);
                                self.connection.send(Packet::new(data)).await
                            }
                            Err(_) => {
                                let pruned = prune_cancelled(&mut responses);
                                tracing::trace!(pruned = pruned, pending = responses.len(), "ping packet sent");
                                self.connection.send(ping_packet()).await
                            }
                        };

                        if let Err(error) = result {
                            tracing::error!(error = ?error, "sending error");
                            break;
                        }
                    }
                }
            }

            tracing::trace!("client inner actor closed");
        });
    }
}

/// Drops pending queries whose callers are gone, e.g. cancelled by a timeout.
fn prune_cancelled(responses: &mut HashMap<RequestId, oneshot::Sender<Bytes>>) -> usize {
    let before = responses.len();
    responses.retain(|_, tx| !tx.is_closed());

    before - responses.len()
}

enum ClientActorMessage {
    Query { query: AdnlMessageQuery, oneshot: oneshot::Sender<Bytes> },
}

impl LiteServerClient {
    pub async fn connect(addr: SocketAddrV4, server_key: &ServerKey) -> anyhow::Result<Self> {
        let inner = AdnlTcpClient::connect(addr, server_key).await?;
        let cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let actor = ClientActor::new(inner, rx, cancel_token.clone());
        actor.run();

        Ok(Self { tx, drop_guard: Arc::new(cancel_token.drop_guard()) })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<R> Service<R> for LiteServerClient where R: Requestable {
    type Response = R::Response;
    type Error = Error;
    type Future = ResponseFuture<R::Response>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.tx.is_closed() {
            return Poll::Ready(Err(Error::ChannelClosed))
        }

        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: R) -> Self::Future {
        let data = req.to_bytes_boxed();

        let query = LiteServerQuery { data };
        let query = to_bytes_boxed(&query);

        let query = AdnlMessageQuery { query_id: random(), query };

        let (tx, rx) = oneshot::channel();

        if self.tx.send(ClientActorMessage::Query { query, oneshot: tx }).is_err() {
            return ResponseFuture::failed(Error::ChannelClosed);
        }

        ResponseFuture::new(rx, self.drop_guard.clone())
    }
}


#[pin_project(project = ResponseStateProj)]
pub enum ResponseState {
    Failed { error: Option<Error> },
    Rx {
        #[pin]
        rx: oneshot::Receiver<Bytes>,
        drop_guard: Arc<DropGuard>
    }
}

#[pin_project]
pub struct ResponseFuture<Response> {
    #[pin]
    state: ResponseState,
    _phantom: PhantomData<Response>,
}

impl<Response> ResponseFuture<Response> {
    fn new(rx: oneshot::Receiver<Bytes>, drop_guard: Arc<DropGuard>) -> Self {
        Self { state: ResponseState::Rx { rx, drop_guard }, _phantom: PhantomData }
    }

    pub(crate) fn failed(error: Error) -> Self {
        Self { state: ResponseState::Failed { error: Some(error) }, _phantom: PhantomData }
    }
}

/// An answer is either the expected boxed type or `liteServer.error`.
fn parse_response<Response>(bytes: &[u8]) -> Result<Response, Error>
    where Response: BareType + Deserialize
{
    let deserializer = Deserializer::from_bytes(bytes);
    if deserializer.peek_constructor_number()? == LiteServerError::CONSTRUCTOR_NUMBER {
        return Err(from_bytes_boxed::<LiteServerError>(bytes)?.into());
    }

    Ok(from_bytes_boxed::<Response>(bytes)?)
}

impl<Response> Future for ResponseFuture<Response> where Response: BareType + Deserialize {
    type Output = Result<Response, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        match this.state.as_mut().project() {
            ResponseStateProj::Failed { error } => {
                Poll::Ready(Err(error.take().unwrap_or(Error::ChannelClosed)))
            },
            ResponseStateProj::Rx { rx, .. } => match ready!(rx.poll(cx)) {
                Ok(response) => Poll::Ready(parse_response(&response)),
                Err(_) => Poll::Ready(Err(Error::OneshotClosed))
            }
        }
    }
}
