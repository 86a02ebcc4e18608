//! The internal IPC surface (§6): one entry point, `dispatch`, matched on a
//! channel name (`conversation:*`, `message:*`, `block:*`, `plan:*`,
//! `todo:*`, `context:calculate-tokens`, `session:compact`, `circuit:mcp-*`,
//! `workspace:*`). The caller on the other end is the excluded UI shell, a
//! trusted process on the same machine — unlike the HTTP bridge and stdio
//! proxy, failures here carry [`PlainError::output_msg`], the original
//! message, not the generic category name (§7).

use serde::Deserialize;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use octave_error::{Error, PlainError};
use octave_ingestion::ingest_assistant_message;
use octave_mcp_proxy::ServerConfig;
use octave_protocol::{Block, Message, Plan, PlanTodoDraft, Todo, TodoStatus, WorkspaceMetadata};
use octave_storage::BlockSearchFilters;

use crate::state::{AppState, now_ms};

/// Dispatches one `(channel, payload)` pair and returns the
/// `{success, data?, error?}` envelope the UI shell expects.
pub async fn dispatch(state: &AppState, channel: &str, payload: Value) -> Value {
    let result = route(state, channel, payload).await;
    match result {
        Ok(data) => json!({"success": true, "data": data}),
        Err(err) => {
            let plain: PlainError = (&err).into();
            tracing::warn!(channel, error = %err, "ipc call failed");
            json!({"success": false, "error": plain.output_msg()})
        }
    }
}

async fn route(state: &AppState, channel: &str, payload: Value) -> Result<Value, Error> {
    match channel {
        "conversation:list" => conversation_list(state, payload),
        "conversation:get-active" => conversation_get_active(state, payload),
        "conversation:create" => conversation_create(state, payload),
        "conversation:set-active" => conversation_set_active(state, payload),
        "conversation:rename" => conversation_rename(state, payload),
        "conversation:delete" => conversation_delete(state, payload),

        "message:list" => message_list(state, payload),
        "message:get-blocks" => message_get_blocks(state, payload),
        "message:save-with-blocks" => message_save_with_blocks(state, payload),
        "message:delete-after" => message_delete_after(state, payload),
        "message:ingest-assistant" => message_ingest_assistant(state, payload),

        "block:bookmark-create" => block_bookmark_create(state, payload),
        "block:bookmark-list" => block_bookmark_list(state, payload),
        "block:bookmark-delete" => block_bookmark_delete(state, payload),
        "block:record-execution" => block_record_execution(state, payload),
        "block:list-executions" => block_list_executions(state, payload),
        "block:search" => block_search(state, payload),

        "plan:create" => plan_create(state, payload),
        "plan:get" => plan_get(state, payload),
        "plan:list" => plan_list(state, payload),
        "plan:update" => plan_update(state, payload),
        "plan:execute" => plan_execute(state, payload),

        "todo:save" => todo_save(state, payload),
        "todo:save-many" => todo_save_many(state, payload),
        "todo:list" => todo_list(state, payload),
        "todo:get" => todo_get(state, payload),
        "todo:update-status" => todo_update_status(state, payload),
        "todo:update-timing" => todo_update_timing(state, payload),
        "todo:delete" => todo_delete(state, payload),

        "context:calculate-tokens" => context_calculate_tokens(state, payload),
        "session:compact" => return session_compact(state, payload).await,

        "circuit:mcp-list-tools" => return circuit_list_tools(state).await,
        "circuit:mcp-call" => return circuit_call(state, payload).await,
        "circuit:mcp-status" => return circuit_status(state).await,
        "circuit:mcp-install" => return circuit_install(state, payload).await,
        "circuit:mcp-start" => return circuit_start(state, payload).await,
        "circuit:mcp-stop" => return circuit_stop(state, payload).await,
        "circuit:mcp-uninstall" => return circuit_uninstall(state, payload).await,
        "circuit:mcp-call-history" => circuit_call_history(state, payload),

        "workspace:get-metadata" => workspace_get_metadata(state, payload),
        "workspace:set-metadata" => workspace_set_metadata(state, payload),

        other => Err(Error::NotImplemented {
            feature: format!("ipc channel {other}"),
        }),
    }
}

fn param<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, Error> {
    serde_json::from_value(payload).map_err(|e| Error::InvalidArgument {
        message: e.to_string(),
    })
}

fn to_value(value: impl serde::Serialize) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::ParseError {
        message: e.to_string(),
    })
}

// ---- conversation:* ----

#[derive(Deserialize)]
struct WorkspaceIdParam {
    #[serde(rename = "workspaceId")]
    workspace_id: String,
}

#[derive(Deserialize)]
struct ConversationIdParam {
    #[serde(rename = "conversationId")]
    conversation_id: String,
}

fn conversation_list(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceIdParam = param(payload)?;
    to_value(state.db.list_conversations(&p.workspace_id)?)
}

fn conversation_get_active(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceIdParam = param(payload)?;
    to_value(state.db.get_active_conversation(&p.workspace_id)?)
}

#[derive(Deserialize)]
struct ConversationCreateParam {
    #[serde(rename = "workspaceId")]
    workspace_id: String,
    #[serde(default)]
    title: Option<String>,
}

fn conversation_create(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ConversationCreateParam = param(payload)?;
    to_value(state.db.create_conversation(&p.workspace_id, p.title)?)
}

fn conversation_set_active(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceAndConversation = param(payload)?;
    state.db.set_active(&p.workspace_id, &p.conversation_id)?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct WorkspaceAndConversation {
    #[serde(rename = "workspaceId")]
    workspace_id: String,
    #[serde(rename = "conversationId")]
    conversation_id: String,
}

#[derive(Deserialize)]
struct ConversationRenameParam {
    #[serde(rename = "conversationId")]
    conversation_id: String,
    title: String,
}

fn conversation_rename(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ConversationRenameParam = param(payload)?;
    state.db.rename_conversation(&p.conversation_id, p.title)?;
    Ok(Value::Null)
}

fn conversation_delete(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ConversationIdParam = param(payload)?;
    state.db.delete_conversation(&p.conversation_id)?;
    Ok(Value::Null)
}

// ---- message:* ----

fn message_list(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ConversationIdParam = param(payload)?;
    to_value(state.db.list_messages(&p.conversation_id)?)
}

#[derive(Deserialize)]
struct MessageIdParam {
    #[serde(rename = "messageId")]
    message_id: String,
}

fn message_get_blocks(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: MessageIdParam = param(payload)?;
    to_value(state.db.get_blocks(&p.message_id)?)
}

#[derive(Deserialize)]
struct MessageSaveParam {
    message: Message,
    #[serde(default)]
    blocks: Vec<Block>,
}

fn message_save_with_blocks(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: MessageSaveParam = param(payload)?;
    state.db.save_message_with_blocks(&p.message, &p.blocks)?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct MessageDeleteAfterParam {
    #[serde(rename = "conversationId")]
    conversation_id: String,
    #[serde(rename = "pivotMessageId")]
    pivot_message_id: String,
}

fn message_delete_after(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: MessageDeleteAfterParam = param(payload)?;
    let deleted = state.db.delete_messages_after(&p.conversation_id, &p.pivot_message_id)?;
    to_value(json!({"deletedCount": deleted}))
}

#[derive(Deserialize)]
struct MessageIngestParam {
    message: Message,
    #[serde(default, rename = "toolTraces")]
    tool_traces: Vec<octave_ingestion::ToolTrace>,
    #[serde(rename = "workspaceRoot")]
    workspace_root: String,
}

fn message_ingest_assistant(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: MessageIngestParam = param(payload)?;
    let parsed = ingest_assistant_message(&state.db, &p.message, &p.tool_traces, &p.workspace_root)?;
    to_value(json!({"blocks": parsed.blocks, "warnings": parsed.errors}))
}

// ---- block:* ----

#[derive(Deserialize)]
struct BlockIdParam {
    #[serde(rename = "blockId")]
    block_id: String,
}

#[derive(Deserialize)]
struct BookmarkCreateParam {
    #[serde(rename = "blockId")]
    block_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

fn block_bookmark_create(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: BookmarkCreateParam = param(payload)?;
    to_value(state.db.create_bookmark(&p.block_id, p.title, p.note, p.tags)?)
}

fn block_bookmark_list(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: BlockIdParam = param(payload)?;
    to_value(state.db.list_bookmarks(&p.block_id)?)
}

#[derive(Deserialize)]
struct BookmarkIdParam {
    #[serde(rename = "bookmarkId")]
    bookmark_id: String,
}

fn block_bookmark_delete(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: BookmarkIdParam = param(payload)?;
    state.db.delete_bookmark(&p.bookmark_id)?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct RecordExecutionParam {
    #[serde(rename = "blockId")]
    block_id: String,
    #[serde(rename = "exitCode")]
    exit_code: i32,
    output: String,
    #[serde(rename = "durationMs")]
    duration_ms: i64,
}

fn block_record_execution(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: RecordExecutionParam = param(payload)?;
    to_value(state.db.record_execution(&p.block_id, p.exit_code, &p.output, p.duration_ms)?)
}

fn block_list_executions(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: BlockIdParam = param(payload)?;
    to_value(state.db.list_executions(&p.block_id)?)
}

#[derive(Deserialize)]
struct BlockSearchParam {
    query: String,
    #[serde(default, rename = "blockType")]
    block_type: Option<octave_protocol::BlockType>,
    #[serde(default, rename = "workspaceId")]
    workspace_id: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

fn block_search(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: BlockSearchParam = param(payload)?;
    let filters = BlockSearchFilters {
        block_type: p.block_type,
        workspace_id: p.workspace_id,
        limit: p.limit,
    };
    to_value(state.db.search_blocks(&p.query, filters)?)
}

// ---- plan:* ----

#[derive(Deserialize)]
struct PlanCreateParam {
    #[serde(rename = "workspaceId")]
    workspace_id: String,
    goal: String,
    #[serde(rename = "planDocument")]
    plan_document: String,
    #[serde(default)]
    todos: Vec<PlanTodoDraft>,
}

fn plan_create(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: PlanCreateParam = param(payload)?;
    to_value(state.db.create_plan(&p.workspace_id, p.goal, p.plan_document, p.todos, now_ms())?)
}

#[derive(Deserialize)]
struct PlanIdParam {
    #[serde(rename = "planId")]
    plan_id: String,
}

fn plan_get(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: PlanIdParam = param(payload)?;
    to_value(state.db.get_plan(&p.plan_id)?)
}

fn plan_list(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceIdParam = param(payload)?;
    to_value(state.db.list_plans(&p.workspace_id)?)
}

#[derive(Deserialize)]
struct PlanUpdateParam {
    plan: Plan,
}

fn plan_update(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: PlanUpdateParam = param(payload)?;
    state.db.update_plan(&p.plan)?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct PlanExecuteParam {
    #[serde(rename = "planId")]
    plan_id: String,
    #[serde(rename = "messageId")]
    message_id: String,
}

fn plan_execute(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: PlanExecuteParam = param(payload)?;
    let todos = state.db.execute_plan(&p.plan_id, &p.message_id, now_ms())?;
    to_value(todos)
}

// ---- todo:* ----

#[derive(Deserialize)]
struct TodoSaveParam {
    todo: Todo,
}

fn todo_save(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoSaveParam = param(payload)?;
    state.db.save_todo(&p.todo)?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct TodoSaveManyParam {
    todos: Vec<Todo>,
}

fn todo_save_many(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoSaveManyParam = param(payload)?;
    state.db.save_todos(&p.todos)?;
    Ok(Value::Null)
}

fn todo_list(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ConversationIdParam = param(payload)?;
    to_value(state.db.list_todos(&p.conversation_id)?)
}

#[derive(Deserialize)]
struct TodoIdParam {
    #[serde(rename = "todoId")]
    todo_id: String,
}

fn todo_get(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoIdParam = param(payload)?;
    to_value(state.db.get_todo(&p.todo_id)?)
}

#[derive(Deserialize)]
struct TodoUpdateStatusParam {
    #[serde(rename = "todoId")]
    todo_id: String,
    status: TodoStatus,
    #[serde(default)]
    progress: Option<u8>,
}

fn todo_update_status(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoUpdateStatusParam = param(payload)?;
    state.db.update_status(&p.todo_id, p.status, p.progress, now_ms())?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct TodoUpdateTimingParam {
    #[serde(rename = "todoId")]
    todo_id: String,
    #[serde(default, rename = "startedAt")]
    started_at: Option<i64>,
    #[serde(default, rename = "completedAt")]
    completed_at: Option<i64>,
    #[serde(default, rename = "actualDurationSecs")]
    actual_duration_secs: Option<i64>,
}

fn todo_update_timing(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoUpdateTimingParam = param(payload)?;
    state
        .db
        .update_timing(&p.todo_id, p.started_at, p.completed_at, p.actual_duration_secs, now_ms())?;
    Ok(Value::Null)
}

fn todo_delete(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: TodoIdParam = param(payload)?;
    state.db.delete_todo(&p.todo_id)?;
    Ok(Value::Null)
}

// ---- context:*, session:* ----

#[derive(Deserialize)]
struct MessagesParam {
    messages: Vec<Message>,
}

fn context_calculate_tokens(_state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: MessagesParam = param(payload)?;
    to_value(octave_context::calculate_tokens(&p.messages))
}

#[derive(Deserialize)]
struct CompactParam {
    messages: Vec<Message>,
    #[serde(default, rename = "keepInitial")]
    keep_initial: Option<usize>,
    #[serde(default, rename = "keepRecent")]
    keep_recent: Option<usize>,
}

async fn session_compact(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: CompactParam = param(payload)?;
    let mut params = octave_context::SmartSelectionParams::default();
    if let Some(keep_initial) = p.keep_initial {
        params.keep_initial = keep_initial;
    }
    if let Some(keep_recent) = p.keep_recent {
        params.keep_recent = keep_recent;
    }
    // A fresh token: the IPC surface is request/response, so a caller that
    // wants to cancel mid-compact has no channel to do it over yet.
    let cancel = CancellationToken::new();
    let outcome = octave_context::compact(&state.compact_settings, &p.messages, params, &cancel).await?;
    to_value(outcome_to_json(&outcome))
}

fn outcome_to_json(outcome: &octave_context::CompactOutcome) -> Value {
    json!({
        "summary": outcome.summary,
        "kept": outcome.kept,
        "summarizedCount": outcome.summarized_count,
        "tokensBefore": outcome.tokens_before,
        "tokensAfter": outcome.tokens_after,
    })
}

// ---- circuit:mcp-* ----

#[derive(Deserialize)]
struct ServerIdParam {
    #[serde(rename = "serverId")]
    server_id: String,
}

#[derive(Deserialize)]
struct McpInstallParam {
    #[serde(rename = "serverId")]
    server_id: String,
    name: String,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default, rename = "extraEnvVars")]
    extra_env_vars: Vec<String>,
    #[serde(default, rename = "autoRestart")]
    auto_restart: bool,
}

async fn circuit_list_tools(state: &AppState) -> Result<Value, Error> {
    to_value(state.registry.list_tools().await)
}

#[derive(Deserialize)]
struct McpCallParam {
    #[serde(rename = "toolName")]
    tool_name: String,
    #[serde(default)]
    arguments: Value,
    #[serde(default, rename = "serverId")]
    server_id: Option<String>,
}

async fn circuit_call(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: McpCallParam = param(payload)?;
    state
        .registry
        .call_tool_scoped(&p.tool_name, p.arguments, p.server_id.as_deref())
        .await
}

async fn circuit_status(state: &AppState) -> Result<Value, Error> {
    to_value(state.registry.status_snapshot().await)
}

async fn circuit_install(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: McpInstallParam = param(payload)?;
    let id = octave_mcp_proxy::normalize_server_id(&p.server_id);
    let mut config = ServerConfig::new(p.name, p.command, p.args);
    config.extra_env_vars = p.extra_env_vars;
    config.auto_restart = p.auto_restart;
    let id = state.registry.install(id, config).await;
    to_value(json!({"serverId": id}))
}

async fn circuit_start(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ServerIdParam = param(payload)?;
    state.registry.start(&p.server_id).await?;
    Ok(Value::Null)
}

async fn circuit_stop(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ServerIdParam = param(payload)?;
    state.registry.stop(&p.server_id).await?;
    Ok(Value::Null)
}

async fn circuit_uninstall(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: ServerIdParam = param(payload)?;
    state.registry.uninstall(&p.server_id).await?;
    Ok(Value::Null)
}

#[derive(Deserialize)]
struct McpCallHistoryParam {
    #[serde(rename = "serverId")]
    server_id: String,
    #[serde(default = "default_call_history_limit")]
    limit: usize,
}

fn default_call_history_limit() -> usize {
    50
}

fn circuit_call_history(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: McpCallHistoryParam = param(payload)?;
    to_value(state.db.list_calls_for_server(&p.server_id, p.limit)?)
}

// ---- workspace:* ----

fn workspace_get_metadata(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceIdParam = param(payload)?;
    to_value(state.db.get_workspace_metadata(&p.workspace_id)?)
}

#[derive(Deserialize)]
struct WorkspaceSetMetadataParam {
    metadata: WorkspaceMetadata,
}

fn workspace_set_metadata(state: &AppState, payload: Value) -> Result<Value, Error> {
    let p: WorkspaceSetMetadataParam = param(payload)?;
    state.db.set_workspace_metadata(&p.metadata)?;
    Ok(Value::Null)
}

#[cfg(test)]
#[path = "ipc.test.rs"]
mod tests;
