use std::collections::HashMap;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::endpoint::DefaultResolver;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection, ProjectionType, ProvisionedThroughput, ReturnValue, ScalarAttributeType, TableStatus};
use chrono::NaiveDateTime;
use serde_json::Value;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::RepositoryStore;
use crate::utils::date::DATE_FMT;

// creates a table keyed by a numeric hash key, optionally with a numeric-keyed `<table>_ndx` index
pub(crate) async fn create_table(client: &Client,
                                 table_name: &str, pk: &str,
                                 pk_type: ScalarAttributeType,
                                 gsi_pk: Option<&str>) -> LibraryResult<()> {
    let mut request = client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(pk)
                .attribute_type(pk_type)
                .build(),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        );

    if let Some(gsi_pk) = gsi_pk {
        let gsi = GlobalSecondaryIndex::builder()
            .index_name(format!("{}_ndx", table_name))
            .key_schema(KeySchemaElement::builder()
                .attribute_name(gsi_pk)
                .key_type(KeyType::Hash).build())
            .projection(Projection::builder().projection_type(ProjectionType::All).build())
            .provisioned_throughput(
                ProvisionedThroughput::builder().read_capacity_units(10).write_capacity_units(10).build())
            .build();
        request = request
            .global_secondary_indexes(gsi)
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(gsi_pk)
                    .attribute_type(ScalarAttributeType::N)
                    .build(),
            );
    }

    match request.send().await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to delete {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        if let Ok(status) = describe_table(client, table_name).await {
            if status != other_status {
                return;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// atomically increments the named counter in the sequences table and returns the new value
pub(crate) async fn next_sequence_value(client: &Client, table_name: &str, sequence: &str) -> LibraryResult<i64> {
    let out = client
        .update_item()
        .table_name(table_name)
        .key("sequence_name", AttributeValue::S(sequence.to_string()))
        .update_expression("ADD next_value :one")
        .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
        .return_values(ReturnValue::UpdatedNew)
        .send()
        .await?;
    out.attributes()
        .map(|attrs| parse_number_attribute("next_value", attrs))
        .filter(|n| *n > 0)
        .ok_or_else(|| LibraryError::database(
            format!("sequence {} did not return a value", sequence).as_str(), None, false))
}

pub(crate) fn parse_item(value: Value) -> Result<HashMap<String, AttributeValue>, String> {
    match value_to_item(value) {
        AttributeValue::M(map) => Ok(map),
        other => Err(format!("failed to parse{:?}", other)),
    }
}

pub(crate) fn parse_string_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<String> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        return Some(str.clone());
    }
    None
}

pub(crate) fn parse_date_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<NaiveDateTime> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        // e.g. 2022-09-24T04:40:35.726029
        if let Ok(date) = NaiveDateTime::parse_from_str(str, DATE_FMT) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn string_date(date: NaiveDateTime) -> AttributeValue {
    AttributeValue::S(format!("{}", date.format(DATE_FMT)))
}

pub(crate) fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> i64 {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = str.parse::<i64>() {
            return n;
        }
    }
    0
}

// appends `#k = :k` to the filter expression; names are aliased since e.g. `name` is reserved
pub(crate) fn add_filter_expr(k: &str, filter_expr: &mut String) -> String {
    let mut op = "=";
    let mut ks = k;
    let parts = k.split(':').collect::<Vec<&str>>();
    if parts.len() > 1 {
        ks = parts[0];
        op = parts[1];
    }
    if filter_expr.is_empty() {
        filter_expr.push_str(format!("#{} {} :{}", ks, op, ks).as_str());
    } else {
        filter_expr.push_str(format!(" AND #{} {} :{}", ks, op, ks).as_str());
    }
    ks.to_string()
}

pub(crate) fn typed_attribute(k: &str, v: &str, numeric_fields: &[&str]) -> AttributeValue {
    if numeric_fields.contains(&k) {
        AttributeValue::N(v.to_string())
    } else {
        AttributeValue::S(v.to_string())
    }
}

// page tokens are the JSON form of the last evaluated key, keeping number and string keys apart
pub(crate) fn to_ddb_page(page: Option<&str>) -> Option<HashMap<String, AttributeValue>> {
    if let Some(page) = page {
        if let Ok(json_map) = serde_json::from_str::<HashMap<String, Value>>(page) {
            let mut attr_map = HashMap::new();
            for (k, v) in json_map {
                match v {
                    Value::Number(n) => { attr_map.insert(k, AttributeValue::N(n.to_string())); }
                    Value::String(s) => { attr_map.insert(k, AttributeValue::S(s)); }
                    _ => {}
                }
            }
            return Some(attr_map);
        }
    }
    None
}

pub(crate) fn from_ddb<T>(page: Option<&str>, page_size: usize,
                          last_evaluated_key: Option<&HashMap<String, AttributeValue>>,
                          records: Vec<T>) -> PaginatedResult<T> {
    let mut next_page: Option<String> = None;
    if let Some(attr_map) = last_evaluated_key {
        let mut json_map = serde_json::Map::new();
        for (k, v) in attr_map {
            match v {
                AttributeValue::S(val) => { json_map.insert(k.clone(), Value::String(val.to_string())); }
                AttributeValue::N(val) => {
                    if let Ok(n) = val.parse::<i64>() {
                        json_map.insert(k.clone(), Value::from(n));
                    }
                }
                _ => {}
            }
        }
        if let Ok(j) = serde_json::to_string(&json_map) {
            next_page = Some(j);
        }
    }
    PaginatedResult::new(page, page_size, next_page, records)
}

fn value_to_item(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(a) => AttributeValue::L(a.into_iter().map(value_to_item).collect()),
        Value::Object(o) => {
            AttributeValue::M(o.into_iter().map(|(k, v)| (k, value_to_item(v))).collect())
        }
    }
}

// helper method to build db-client with tracing enabled
pub(crate) async fn build_db_client(store: RepositoryStore) -> Client {
    match store {
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let resolver = DefaultResolver::new();
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_resolver(resolver).build();
            Client::from_conf(dynamodb_local_config)
        }
        _ => {
            //Get config from environment.
            let config = aws_config::load_from_env().await;
            //Create the DynamoDB client.
            Client::new(&config)
        }
    }
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<DeleteItemError>> for LibraryError {
    fn from(err: SdkError<DeleteItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<QueryError>> for LibraryError {
    fn from(err: SdkError<QueryError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    if let Some(b) = opts {
        //"ceeded" as in ProvisionedThroughputExceeded / LimitExceeded
        return b.windows(6).any(|w| w == b"ceeded");
    }
    false
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde_json::json;
    use crate::utils::ddb::{add_filter_expr, from_ddb, has_exceeded_limit, parse_item, parse_number_attribute, parse_string_attribute, to_ddb_page, typed_attribute};

    #[tokio::test]
    async fn test_should_build_filter_expr() {
        let mut expr = String::new();
        assert_eq!("author_id", add_filter_expr("author_id", &mut expr));
        assert_eq!("title", add_filter_expr("title:<>", &mut expr));
        assert_eq!("#author_id = :author_id AND #title <> :title", expr);
    }

    #[tokio::test]
    async fn test_should_round_trip_page_tokens() {
        let key = HashMap::from([
            ("book_id".to_string(), AttributeValue::N("42".to_string())),
            ("kind".to_string(), AttributeValue::S("book".to_string())),
        ]);
        let res = from_ddb::<()>(None, 10, Some(&key), vec![]);
        let token = res.next_page.expect("should have next page");
        let parsed = to_ddb_page(Some(token.as_str())).expect("should parse token");
        assert_eq!(key, parsed);
        assert!(to_ddb_page(None).is_none());
    }

    #[tokio::test]
    async fn test_should_parse_item() {
        let item = parse_item(json!({"book_id": 7, "title": "Dune"})).expect("should parse item");
        assert_eq!(7, parse_number_attribute("book_id", &item));
        assert_eq!(Some("Dune".to_string()), parse_string_attribute("title", &item));
        assert!(parse_item(json!("scalar")).is_err());
    }

    #[tokio::test]
    async fn test_should_type_attributes() {
        assert_eq!(AttributeValue::N("3".to_string()), typed_attribute("author_id", "3", &["author_id"]));
        assert_eq!(AttributeValue::S("3".to_string()), typed_attribute("title", "3", &["author_id"]));
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceededException")));
        assert!(!has_exceeded_limit(Some(b"oops")));
        assert!(!has_exceeded_limit(None));
    }
}
