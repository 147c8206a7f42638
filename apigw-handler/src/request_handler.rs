use serde::Serialize;
use tracing::{error, info};

use crate::config::ConfigSource;
use crate::error::HandlerError;
use crate::record::{self, Record};
use crate::store::RecordStore;
use crate::writer::StoreWriter;

pub const CONTENT_TYPE_JSON: &str = "application/json";
/// Request id logged when the invocation carries no Lambda context.
pub const UNKNOWN_REQUEST_ID: &str = "unknown";
const INSERTED_MESSAGE: &str = "Successfully inserted data!";

/// Correlation metadata for one invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
    pub source_ip: Option<String>,
    pub http_method: String,
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct RequestEnvelope {
    /// Raw body bytes, decoded as UTF-8 only when parsed.
    pub body: Option<Vec<u8>>,
    pub context: InvocationContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBody {
    pub message: String,
}

impl ApiResponse {
    fn inserted() -> Self {
        ApiResponse {
            status_code: 200,
            body: ResponseBody {
                message: INSERTED_MESSAGE.to_string(),
            },
        }
    }
}

pub struct RequestHandler<'a, S, C> {
    store: &'a S,
    config: C,
}

impl<'a, S: RecordStore, C: ConfigSource> RequestHandler<'a, S, C> {
    pub fn new(store: &'a S, config: C) -> Self {
        Self { store, config }
    }

    /// Handles one request. Failures are logged here and returned to the caller.
    pub async fn handle(&self, envelope: RequestEnvelope) -> Result<ApiResponse, HandlerError> {
        let context = &envelope.context;
        info!(
            event = "request_received",
            request_id = %context.request_id,
            source_ip = context.source_ip.as_deref(),
            http_method = %context.http_method,
            path = %context.path,
        );

        self.process(&envelope).await.map_err(|err| {
            error!(
                event = "error",
                request_id = %context.request_id,
                error_type = err.category(),
                error_message = %err,
            );
            err
        })
    }

    async fn process(&self, envelope: &RequestEnvelope) -> Result<ApiResponse, HandlerError> {
        let config = self.config.load()?;
        let request_id = envelope.context.request_id.as_str();

        let record = match envelope.body.as_deref().filter(|body| !body.is_empty()) {
            Some(body) => {
                let fields = record::parse_body(body)?;
                let item_id = fields.get("id").and_then(record::text_of);
                info!(
                    event = "processing_request",
                    request_id,
                    item_id = item_id.as_deref(),
                );
                Record::from_fields(&fields)?
            }
            None => {
                info!(event = "processing_default_request", request_id);
                Record::with_default_payload()
            }
        };

        StoreWriter::new(self.store, &config.table_name, config.retry)
            .put(&record, request_id)
            .await?;

        info!(
            event = "dynamodb_write_success",
            request_id,
            table = %config.table_name,
            item_id = %record.id,
        );

        Ok(ApiResponse::inserted())
    }
}
