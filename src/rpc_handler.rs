//! RPC method handler for the Startpage JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be tested without stdin/stdout.
//! [`handle_method`] dispatches one call to the [`App`] behind an async mutex.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::managers::collection_controller::{CollectionController, Settlement};
use crate::managers::drag_reorder::DragEnd;
use crate::services::link_safety::secure_href;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{Bookmark, BookmarkDraft};
use crate::types::icon::{suggest_icon, IconName};
use crate::types::item::OrderableItem;
use crate::types::task::Task;

const REDACTED: &str = "********";

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing {}", key))
}

fn parse_params<P: DeserializeOwned>(params: &Value) -> Result<P, String> {
    serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<S: serde::Serialize>(value: &S) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Bookmark as rendered: stored fields plus the resolved icon and a safe href.
fn bookmark_view(bookmark: &Bookmark) -> Result<Value, String> {
    let mut view = to_json(bookmark)?;
    if let Some(map) = view.as_object_mut() {
        map.insert(
            "icon".to_string(),
            json!(IconName::resolve(bookmark.icon_name.as_deref())),
        );
        map.insert("href".to_string(), json!(secure_href(&bookmark.url)));
    }
    Ok(view)
}

fn bookmark_list(controller: &CollectionController<Bookmark>) -> Result<Value, String> {
    controller
        .items()
        .iter()
        .map(bookmark_view)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn task_list(controller: &CollectionController<Task>) -> Result<Value, String> {
    to_json(&controller.items())
}

/// Response for a settled mutation: the outcome and the list as it now stands.
fn settled<T: OrderableItem>(
    settlement: Option<Settlement>,
    controller: &CollectionController<T>,
    list: fn(&CollectionController<T>) -> Result<Value, String>,
) -> Result<Value, String> {
    Ok(json!({
        "settlement": settlement,
        "items": list(controller)?,
        "loadError": controller.load_error(),
    }))
}

/// A list read. A session whose last load failed reports the failure
/// rather than a list that only looks empty.
fn loaded<T: OrderableItem>(
    controller: &CollectionController<T>,
    list: fn(&CollectionController<T>) -> Result<Value, String>,
) -> Result<Value, String> {
    match controller.load_error() {
        Some(e) => Err(format!("load failed: {}", e)),
        None => list(controller),
    }
}

/// Rejects drafts the add/edit form would not submit.
fn check_bookmark_draft(draft: &BookmarkDraft) -> Result<(), String> {
    if draft.title.trim().is_empty() {
        return Err("missing title".to_string());
    }
    if draft.url.trim().is_empty() {
        return Err("missing url".to_string());
    }
    Ok(())
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let mut a = app.lock().await;
    a.sync_identity().await;

    match method {
        // ─── Auth ───
        "auth.sign_in" => {
            let identity = a.sign_in().await.map_err(|e| e.to_string())?;
            to_json(&identity)
        }
        "auth.sign_out" => {
            a.sign_out().await.map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.status" => {
            let identity = a.current_identity().cloned();
            Ok(json!({"signedIn": identity.is_some(), "identity": identity}))
        }

        // ─── Bookmarks ───
        "bookmark.list" => match a.session() {
            Some(session) => loaded(&session.bookmarks, bookmark_list),
            None => Ok(json!([])),
        },
        "bookmark.add" => {
            let draft: BookmarkDraft = parse_params(params)?;
            check_bookmark_draft(&draft)?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.bookmarks.add(draft).await.map_err(|e| e.to_string())?;
            settled(Some(settlement), &session.bookmarks, bookmark_list)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?.to_string();
            let draft: BookmarkDraft = parse_params(params)?;
            check_bookmark_draft(&draft)?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.bookmarks.edit(&id, draft).await.map_err(|e| e.to_string())?;
            settled(Some(settlement), &session.bookmarks, bookmark_list)
        }
        "bookmark.delete_request" => {
            let id = str_param(params, "id")?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.bookmarks.request_delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"pendingDelete": id}))
        }
        "bookmark.delete_cancel" => {
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.bookmarks.cancel_delete();
            Ok(json!({"ok": true}))
        }
        "bookmark.delete_confirm" => {
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.bookmarks.confirm_delete().await.map_err(|e| e.to_string())?;
            settled(Some(settlement), &session.bookmarks, bookmark_list)
        }
        "bookmark.drag_end" => {
            let drag: DragEnd = parse_params(params)?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.bookmarks.on_drag_end(drag).await.map_err(|e| e.to_string())?;
            settled(settlement, &session.bookmarks, bookmark_list)
        }
        "bookmark.open" => {
            let id = str_param(params, "id")?;
            let navigation = a.open_bookmark(id).map_err(|e| e.to_string())?;
            to_json(&navigation)
        }

        // ─── Tasks ───
        "task.list" => match a.session() {
            Some(session) => loaded(&session.tasks, task_list),
            None => Ok(json!([])),
        },
        "task.add" => {
            let text = str_param(params, "text")?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.task_input = text.to_string();
            let settlement = a.submit_task().await.map_err(|e| e.to_string())?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            settled(settlement, &session.tasks, task_list)
        }
        "task.toggle" => {
            let id = str_param(params, "id")?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.tasks.toggle(id).await.map_err(|e| e.to_string())?;
            settled(Some(settlement), &session.tasks, task_list)
        }
        "task.delete_request" => {
            let id = str_param(params, "id")?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.tasks.request_delete(id).map_err(|e| e.to_string())?;
            Ok(json!({"pendingDelete": id}))
        }
        "task.delete_cancel" => {
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.tasks.cancel_delete();
            Ok(json!({"ok": true}))
        }
        "task.delete_confirm" => {
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.tasks.confirm_delete().await.map_err(|e| e.to_string())?;
            settled(Some(settlement), &session.tasks, task_list)
        }
        "task.drag_end" => {
            let drag: DragEnd = parse_params(params)?;
            let session = a.session_mut().map_err(|e| e.to_string())?;
            let settlement = session.tasks.on_drag_end(drag).await.map_err(|e| e.to_string())?;
            settled(settlement, &session.tasks, task_list)
        }
        "task.reload" => {
            let session = a.session_mut().map_err(|e| e.to_string())?;
            session.tasks.reload().await.map_err(|e| e.to_string())?;
            task_list(&session.tasks)
        }

        // ─── Calendar ───
        "calendar.events" => {
            let events = a.refresh_events().await;
            to_json(&events)
        }

        // ─── Settings ───
        "settings.get" => {
            let mut settings = a.settings_engine.get_settings().clone();
            if settings.account.access_token.is_some() {
                settings.account.access_token = Some(REDACTED.to_string());
            }
            to_json(&settings)
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Icons ───
        "icon.suggest" => {
            let input = str_param(params, "input")?;
            let current = IconName::resolve(params.get("current").and_then(Value::as_str));
            Ok(json!({"icon": suggest_icon(input, current)}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
