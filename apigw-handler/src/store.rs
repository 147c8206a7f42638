use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use crate::error::StoreError;
use crate::record::Record;

/// Upsert-by-key write primitive of the backing table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_record(&self, table: &str, record: &Record) -> Result<(), StoreError>;
}

pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecordStore for DynamoStore {
    async fn put_record(&self, table: &str, record: &Record) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_for(record)))
            .send()
            .await
            .map_err(|err| {
                let code = err
                    .as_service_error()
                    .and_then(|service_err| service_err.code())
                    .unwrap_or("SdkError")
                    .to_string();
                StoreError::from_code(code, DisplayErrorContext(&err).to_string())
            })?;

        Ok(())
    }
}

fn item_for(record: &Record) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert("id".to_string(), AttributeValue::S(record.id.clone()));
    item.insert("year".to_string(), AttributeValue::N(record.year.clone()));
    item.insert("title".to_string(), AttributeValue::S(record.title.clone()));
    item
}
