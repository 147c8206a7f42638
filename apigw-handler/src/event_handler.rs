use lambda_http::request::RequestContext;
use lambda_http::{Body, Error, Request, RequestExt, Response};
use tracing::{info_span, Instrument};

use crate::config::ConfigSource;
use crate::request_handler::{
    InvocationContext, RequestEnvelope, RequestHandler, CONTENT_TYPE_JSON, UNKNOWN_REQUEST_ID,
};
use crate::store::RecordStore;

/// Adapts an API Gateway proxy event to the request handler and back.
pub(crate) async fn function_handler<S: RecordStore, C: ConfigSource>(
    store: &S,
    config: C,
    event: Request,
) -> Result<Response<Body>, Error> {
    let envelope = envelope_from(&event);
    let span = info_span!("invocation", request_id = %envelope.context.request_id);

    let response = RequestHandler::new(store, config)
        .handle(envelope)
        .instrument(span)
        .await?;

    Ok(Response::builder()
        .status(response.status_code)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .body(Body::Text(serde_json::to_string(&response.body)?))?)
}

fn envelope_from(event: &Request) -> RequestEnvelope {
    let body: &[u8] = event.body().as_ref();
    let body = (!body.is_empty()).then(|| body.to_vec());

    let request_id = event
        .lambda_context_ref()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string());

    RequestEnvelope {
        body,
        context: InvocationContext {
            request_id,
            source_ip: source_ip(event),
            http_method: event.method().as_str().to_string(),
            path: event.uri().path().to_string(),
        },
    }
}

fn source_ip(event: &Request) -> Option<String> {
    match event.request_context_ref()? {
        RequestContext::ApiGatewayV1(ctx) => ctx.identity.source_ip.clone(),
        RequestContext::ApiGatewayV2(ctx) => ctx.http.source_ip.clone(),
        _ => None,
    }
}
