use std::{convert::Infallible, net::SocketAddr, pin::Pin, sync::Arc};

use chrono::Local;
use hyper::{
    Request,
    body::{Body, Incoming as IncomingBody},
    service::Service as HyperService,
};
use log::{error, info, trace};

use super::handler::{Handler, Reply, RequestInfo, Status, respond};

/// A hyper service that runs every request through a [`Handler`] and writes an access log line
/// for it
pub struct Service<H> {
    handler: Arc<H>,

    /// The address of the connected client, if known
    peer: Option<SocketAddr>,
}

impl<H> Clone for Service<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            peer: self.peer,
        }
    }
}

impl<H: Handler> Service<H> {
    pub fn new(handler: Arc<H>) -> Self {
        Service {
            handler,
            peer: None,
        }
    }

    /// A copy of this service bound to a client connection
    pub fn for_peer(&self, peer: SocketAddr) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            peer: Some(peer),
        }
    }

    /// Run the handler, turning errors into a 500 response
    pub fn dispatch(&self, request: &RequestInfo) -> Reply {
        let response = self.handler.handle(request).unwrap_or_else(|e| {
            error!("Failed to handle {} {}: {e}", request.method, request.path);
            respond(Status::InternalServerError)
        });

        info!("{}", self.access_log_line(request, &response));
        response
    }

    /// `<client> - - [<time>] "<method> <target> <version>" <status> <length>`
    fn access_log_line(&self, request: &RequestInfo, response: &Reply) -> String {
        let client = self
            .peer
            .map_or_else(|| "-".to_string(), |peer| peer.ip().to_string());
        let target = match &request.query {
            Some(query) => format!("{}?{query}", request.path),
            None => request.path.clone(),
        };
        let length = response
            .body()
            .size_hint()
            .exact()
            .map_or_else(|| "-".to_string(), |len| len.to_string());

        format!(
            "{client} - - [{}] \"{} {target} {:?}\" {} {length}",
            Local::now().format("%d/%b/%Y %H:%M:%S"),
            request.method,
            request.version,
            response.status().as_u16(),
        )
    }
}

impl<H: Handler + 'static> HyperService<Request<IncomingBody>> for Service<H> {
    type Response = Reply;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<IncomingBody>) -> Self::Future {
        let service = self.clone();
        let request = RequestInfo::from_request(&req);
        trace!("Request headers: {:?}", req.headers());

        Box::pin(async move { Ok(service.dispatch(&request)) })
    }
}
