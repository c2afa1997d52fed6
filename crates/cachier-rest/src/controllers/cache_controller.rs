//! Redis data-structure controller.
//!
//! Thin passthrough: query parameters in, Redis results out. Reads of a
//! missing string or field, and of an empty list, set or hash, are 404.

use crate::{
    extractors::ValidatedJson,
    responses::{found, ok, ApiResult, AppError},
    state::AppState,
};
use cachier_core::CachierError;
use cachier_service::{
    AddedResponse, ChannelQuery, CountResponse, ExistsResponse, HashFieldQuery,
    HyperLogLogRequest, KeyQuery, KeyValueQuery, MessageResponse, PublishQuery, PublishResponse,
    RangeQuery, ScoredValueQuery, SetHashFieldQuery, SetStringQuery, TransactionRequest,
};
use axum::{
    extract::{Query, State},
    routing::{delete, get, post},
    Router,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Creates the data-structure router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/set-string", post(set_string))
        .route("/get-string", get(get_string))
        .route("/remove-string", delete(remove_string))
        .route("/set-hash-field", post(set_hash_field))
        .route("/get-hash-field", get(get_hash_field))
        .route("/remove-hash-field", delete(remove_hash_field))
        .route("/get-all-hash-fields", get(get_all_hash_fields))
        .route("/add-to-list", post(add_to_list))
        .route("/get-list", get(get_list))
        .route("/remove-from-list", delete(remove_from_list))
        .route("/add-to-set", post(add_to_set))
        .route("/get-set-members", get(get_set_members))
        .route("/remove-from-set", delete(remove_from_set))
        .route("/add-to-sorted-set", post(add_to_sorted_set))
        .route("/get-sorted-set-range", get(get_sorted_set_range))
        .route("/remove-from-sorted-set", delete(remove_from_sorted_set))
        .route("/add-to-hyperloglog", post(add_to_hyperloglog))
        .route("/get-hyperloglog-count", get(get_hyperloglog_count))
        .route("/execute-transaction", post(execute_transaction))
        .route("/subscribe", post(subscribe).delete(unsubscribe))
        .route("/subscriptions", get(subscriptions))
        .route("/publish", post(publish))
        .route("/key-exists", get(key_exists))
        .route("/remove-data", delete(remove_data))
}

/// 404 for a removal that found nothing.
fn removed(done: bool, what: &'static str, key: &str, message: &str) -> ApiResult<MessageResponse> {
    if done {
        ok(MessageResponse::new(message))
    } else {
        Err(AppError(CachierError::not_found(what, key)))
    }
}

/// 404 for an empty collection.
fn non_empty<T>(items: Vec<T>, what: &'static str, key: &str) -> Result<Vec<T>, AppError> {
    found(Some(items).filter(|i| !i.is_empty()), what, key)
}

// ============ Strings ============

/// Set a string, optionally with an absolute expiration.
#[utoipa::path(
    post,
    path = "/cache/set-string",
    tag = "cache",
    params(SetStringQuery),
    responses(
        (status = 200, description = "String set", body = MessageResponse),
        (status = 400, description = "Expiration time already passed")
    )
)]
pub async fn set_string(
    State(state): State<AppState>,
    Query(query): Query<SetStringQuery>,
) -> ApiResult<MessageResponse> {
    debug!("Set string request: {}", query.key);

    let written = state
        .data_structures()?
        .set_string(&query.key, &query.value, query.expiration_time)
        .await?;

    if written {
        ok(MessageResponse::new("String set successfully."))
    } else {
        Err(AppError(CachierError::validation("Expiration time must be in the future")))
    }
}

/// Get a string.
#[utoipa::path(
    get,
    path = "/cache/get-string",
    tag = "cache",
    params(KeyQuery),
    responses(
        (status = 200, description = "String value", body = String),
        (status = 404, description = "String not found")
    )
)]
pub async fn get_string(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> ApiResult<String> {
    let value = state.data_structures()?.get_string(&query.key).await?;
    ok(found(value, "String", &query.key)?)
}

/// Remove a string.
#[utoipa::path(
    delete,
    path = "/cache/remove-string",
    tag = "cache",
    params(KeyQuery),
    responses(
        (status = 200, description = "String removed", body = MessageResponse),
        (status = 404, description = "String not found")
    )
)]
pub async fn remove_string(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> ApiResult<MessageResponse> {
    let done = state.data_structures()?.remove_string(&query.key).await?;
    removed(done, "String", &query.key, "String removed successfully.")
}

// ============ Hashes ============

/// Set a hash field.
#[utoipa::path(
    post,
    path = "/cache/set-hash-field",
    tag = "cache",
    params(SetHashFieldQuery),
    responses((status = 200, description = "Field set; `added` is false when it was overwritten", body = AddedResponse))
)]
pub async fn set_hash_field(
    State(state): State<AppState>,
    Query(query): Query<SetHashFieldQuery>,
) -> ApiResult<AddedResponse> {
    let added = state
        .data_structures()?
        .set_hash_field(&query.key, &query.field, &query.value)
        .await?;
    ok(AddedResponse { added })
}

/// Get a hash field.
#[utoipa::path(
    get,
    path = "/cache/get-hash-field",
    tag = "cache",
    params(HashFieldQuery),
    responses(
        (status = 200, description = "Field value", body = String),
        (status = 404, description = "Hash field not found")
    )
)]
pub async fn get_hash_field(State(state): State<AppState>, Query(query): Query<HashFieldQuery>) -> ApiResult<String> {
    let value = state
        .data_structures()?
        .get_hash_field(&query.key, &query.field)
        .await?;
    ok(found(value, "Hash field", format!("{}.{}", query.key, query.field))?)
}

/// Remove a hash field.
#[utoipa::path(
    delete,
    path = "/cache/remove-hash-field",
    tag = "cache",
    params(HashFieldQuery),
    responses(
        (status = 200, description = "Field removed", body = MessageResponse),
        (status = 404, description = "Hash field not found")
    )
)]
pub async fn remove_hash_field(
    State(state): State<AppState>,
    Query(query): Query<HashFieldQuery>,
) -> ApiResult<MessageResponse> {
    let done = state
        .data_structures()?
        .remove_hash_field(&query.key, &query.field)
        .await?;
    removed(done, "Hash field", &query.key, "Hash field removed successfully.")
}

/// Get every field of a hash.
#[utoipa::path(
    get,
    path = "/cache/get-all-hash-fields",
    tag = "cache",
    params(KeyQuery),
    responses(
        (status = 200, description = "Field map"),
        (status = 404, description = "No hash fields found")
    )
)]
pub async fn get_all_hash_fields(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<BTreeMap<String, String>> {
    let fields = state.data_structures()?.get_all_hash_fields(&query.key).await?;
    if fields.is_empty() {
        return Err(AppError(CachierError::not_found("Hash", &query.key)));
    }
    ok(fields)
}

// ============ Lists ============

/// Append to a list.
#[utoipa::path(
    post,
    path = "/cache/add-to-list",
    tag = "cache",
    params(KeyValueQuery),
    responses((status = 200, description = "Item added", body = MessageResponse))
)]
pub async fn add_to_list(State(state): State<AppState>, Query(query): Query<KeyValueQuery>) -> ApiResult<MessageResponse> {
    state.data_structures()?.add_to_list(&query.key, &query.value).await?;
    ok(MessageResponse::new("Item added to list."))
}

/// Read a range of a list.
#[utoipa::path(
    get,
    path = "/cache/get-list",
    tag = "cache",
    params(RangeQuery),
    responses(
        (status = 200, description = "List items", body = [String]),
        (status = 404, description = "List not found")
    )
)]
pub async fn get_list(State(state): State<AppState>, Query(query): Query<RangeQuery>) -> ApiResult<Vec<String>> {
    let items = state
        .data_structures()?
        .get_list(&query.key, query.start, query.stop)
        .await?;
    ok(non_empty(items, "List", &query.key)?)
}

/// Remove every occurrence of a value from a list.
#[utoipa::path(
    delete,
    path = "/cache/remove-from-list",
    tag = "cache",
    params(KeyValueQuery),
    responses(
        (status = 200, description = "Item removed", body = MessageResponse),
        (status = 404, description = "Item not in list")
    )
)]
pub async fn remove_from_list(
    State(state): State<AppState>,
    Query(query): Query<KeyValueQuery>,
) -> ApiResult<MessageResponse> {
    let done = state
        .data_structures()?
        .remove_from_list(&query.key, &query.value)
        .await?;
    removed(done, "List item", &query.value, "Item removed from list.")
}

// ============ Sets ============

/// Add a member to a set.
#[utoipa::path(
    post,
    path = "/cache/add-to-set",
    tag = "cache",
    params(KeyValueQuery),
    responses((status = 200, description = "`added` is false when already a member", body = AddedResponse))
)]
pub async fn add_to_set(State(state): State<AppState>, Query(query): Query<KeyValueQuery>) -> ApiResult<AddedResponse> {
    let added = state.data_structures()?.add_to_set(&query.key, &query.value).await?;
    ok(AddedResponse { added })
}

/// Read the members of a set.
#[utoipa::path(
    get,
    path = "/cache/get-set-members",
    tag = "cache",
    params(KeyQuery),
    responses(
        (status = 200, description = "Set members", body = [String]),
        (status = 404, description = "Set not found")
    )
)]
pub async fn get_set_members(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> ApiResult<Vec<String>> {
    let members = state.data_structures()?.get_set_members(&query.key).await?;
    ok(non_empty(members, "Set", &query.key)?)
}

/// Remove a member from a set.
#[utoipa::path(
    delete,
    path = "/cache/remove-from-set",
    tag = "cache",
    params(KeyValueQuery),
    responses(
        (status = 200, description = "Member removed", body = MessageResponse),
        (status = 404, description = "Not a member")
    )
)]
pub async fn remove_from_set(
    State(state): State<AppState>,
    Query(query): Query<KeyValueQuery>,
) -> ApiResult<MessageResponse> {
    let done = state
        .data_structures()?
        .remove_from_set(&query.key, &query.value)
        .await?;
    removed(done, "Set member", &query.value, "Item removed from set.")
}

// ============ Sorted sets ============

/// Add a scored member to a sorted set.
#[utoipa::path(
    post,
    path = "/cache/add-to-sorted-set",
    tag = "cache",
    params(ScoredValueQuery),
    responses((status = 200, description = "`added` is false when only the score changed", body = AddedResponse))
)]
pub async fn add_to_sorted_set(
    State(state): State<AppState>,
    Query(query): Query<ScoredValueQuery>,
) -> ApiResult<AddedResponse> {
    let added = state
        .data_structures()?
        .add_to_sorted_set(&query.key, &query.value, query.score)
        .await?;
    ok(AddedResponse { added })
}

/// Read members by ascending score.
#[utoipa::path(
    get,
    path = "/cache/get-sorted-set-range",
    tag = "cache",
    params(RangeQuery),
    responses(
        (status = 200, description = "Members", body = [String]),
        (status = 404, description = "Sorted set not found")
    )
)]
pub async fn get_sorted_set_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<String>> {
    let members = state
        .data_structures()?
        .get_sorted_set_range(&query.key, query.start, query.stop)
        .await?;
    ok(non_empty(members, "Sorted set", &query.key)?)
}

/// Remove a member from a sorted set.
#[utoipa::path(
    delete,
    path = "/cache/remove-from-sorted-set",
    tag = "cache",
    params(KeyValueQuery),
    responses(
        (status = 200, description = "Member removed", body = MessageResponse),
        (status = 404, description = "Not a member")
    )
)]
pub async fn remove_from_sorted_set(
    State(state): State<AppState>,
    Query(query): Query<KeyValueQuery>,
) -> ApiResult<MessageResponse> {
    let done = state
        .data_structures()?
        .remove_from_sorted_set(&query.key, &query.value)
        .await?;
    removed(done, "Sorted set member", &query.value, "Item removed from sorted set.")
}

// ============ HyperLogLog ============

/// Add values to a HyperLogLog.
#[utoipa::path(
    post,
    path = "/cache/add-to-hyperloglog",
    tag = "cache",
    request_body = HyperLogLogRequest,
    responses((status = 200, description = "`added` is true when the estimate changed", body = AddedResponse))
)]
pub async fn add_to_hyperloglog(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<HyperLogLogRequest>,
) -> ApiResult<AddedResponse> {
    let added = state
        .data_structures()?
        .add_to_hyperloglog(&request.key, &request.values)
        .await?;
    ok(AddedResponse { added })
}

/// Estimated number of distinct values.
#[utoipa::path(
    get,
    path = "/cache/get-hyperloglog-count",
    tag = "cache",
    params(KeyQuery),
    responses((status = 200, description = "Cardinality estimate", body = CountResponse))
)]
pub async fn get_hyperloglog_count(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<CountResponse> {
    let count = state.data_structures()?.get_hyperloglog_count(&query.key).await?;
    ok(CountResponse { count })
}

// ============ Transactions ============

/// Run set/delete operations atomically.
#[utoipa::path(
    post,
    path = "/cache/execute-transaction",
    tag = "cache",
    request_body = TransactionRequest,
    responses(
        (status = 200, description = "Transaction committed", body = MessageResponse),
        (status = 422, description = "No operations given")
    )
)]
pub async fn execute_transaction(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TransactionRequest>,
) -> ApiResult<MessageResponse> {
    debug!("Transaction request with {} operations", request.ops.len());

    state.data_structures()?.execute_transaction(&request.ops).await?;
    ok(MessageResponse::new("Transaction executed successfully."))
}

// ============ Pub/Sub ============

/// Start logging messages from a channel.
#[utoipa::path(
    post,
    path = "/cache/subscribe",
    tag = "cache",
    params(ChannelQuery),
    responses((status = 200, description = "Subscribed", body = MessageResponse))
)]
pub async fn subscribe(State(state): State<AppState>, Query(query): Query<ChannelQuery>) -> ApiResult<MessageResponse> {
    let started = state.data_structures()?.subscribe(&query.channel).await?;
    ok(MessageResponse::new(if started {
        "Subscribed to channel."
    } else {
        "Already subscribed to channel."
    }))
}

/// Stop listening on a channel.
#[utoipa::path(
    delete,
    path = "/cache/subscribe",
    tag = "cache",
    params(ChannelQuery),
    responses(
        (status = 200, description = "Unsubscribed", body = MessageResponse),
        (status = 404, description = "No subscription for channel")
    )
)]
pub async fn unsubscribe(State(state): State<AppState>, Query(query): Query<ChannelQuery>) -> ApiResult<MessageResponse> {
    let done = state.data_structures()?.unsubscribe(&query.channel);
    removed(done, "Subscription", &query.channel, "Unsubscribed from channel.")
}

/// Channels with an active listener.
#[utoipa::path(
    get,
    path = "/cache/subscriptions",
    tag = "cache",
    responses((status = 200, description = "Subscribed channels", body = [String]))
)]
pub async fn subscriptions(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    ok(state.data_structures()?.subscriptions())
}

/// Publish a message.
#[utoipa::path(
    post,
    path = "/cache/publish",
    tag = "cache",
    params(PublishQuery),
    responses((status = 200, description = "Message published", body = PublishResponse))
)]
pub async fn publish(State(state): State<AppState>, Query(query): Query<PublishQuery>) -> ApiResult<PublishResponse> {
    let receivers = state
        .data_structures()?
        .publish(&query.channel, &query.message)
        .await?;
    ok(PublishResponse { receivers })
}

// ============ Keys ============

/// Check whether a key exists.
#[utoipa::path(
    get,
    path = "/cache/key-exists",
    tag = "cache",
    params(KeyQuery),
    responses((status = 200, description = "Existence flag", body = ExistsResponse))
)]
pub async fn key_exists(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> ApiResult<ExistsResponse> {
    let exists = state.data_structures()?.key_exists(&query.key).await?;
    ok(ExistsResponse { exists })
}

/// Delete a key of any type.
#[utoipa::path(
    delete,
    path = "/cache/remove-data",
    tag = "cache",
    params(KeyQuery),
    responses(
        (status = 200, description = "Key removed", body = MessageResponse),
        (status = 404, description = "Key not found")
    )
)]
pub async fn remove_data(State(state): State<AppState>, Query(query): Query<KeyQuery>) -> ApiResult<MessageResponse> {
    let done = state.data_structures()?.remove_data(&query.key).await?;
    removed(done, "Key", &query.key, "Key removed successfully.")
}
