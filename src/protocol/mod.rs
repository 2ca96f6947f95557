use std::panic::AssertUnwindSafe;

use serde_json::{json, Value};

use crate::error::ProtocolError;
use crate::model::row::TranslationRow;
use crate::model::snapshot::Theme;
use crate::services::batch;
use crate::services::store::KeyValueStore;
use crate::services::workspace::Workspace;

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn parse_rows_from_payload(payload: &Value) -> Result<Vec<TranslationRow>, String> {
    let arr = payload
        .get("rows")
        .and_then(|v| v.as_array())
        .ok_or_else(|| ProtocolError::Missing("rows").to_string())?;

    let mut rows: Vec<TranslationRow> = Vec::with_capacity(arr.len());

    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<TranslationRow>(v) {
            Ok(r) => rows.push(r),
            Err(e) => return Err(format!("invalid row at index {}: {}", i, e)),
        }
    }

    Ok(rows)
}

fn parse_theme(payload: &Value) -> Result<Theme, ProtocolError> {
    let v = payload
        .get("theme")
        .cloned()
        .ok_or(ProtocolError::Missing("theme"))?;
    serde_json::from_value(v).map_err(|source| ProtocolError::Invalid {
        field: "theme",
        source,
    })
}

/// Runs one request handler; a panic becomes an `internal core error` reply
/// instead of ending the process.
pub fn guarded(handler: impl FnOnce() -> String) -> String {
    match std::panic::catch_unwind(AssertUnwindSafe(handler)) {
        Ok(resp) => resp,
        Err(_) => {
            tracing::error!("request handler panicked");
            json!({
                "status": "error",
                "message": "internal core error"
            })
            .to_string()
        }
    }
}

/// One UI connection. Owns the workspace for the lifetime of the process and
/// answers each request line with the refreshed view.
pub struct Session<S: KeyValueStore> {
    workspace: Workspace<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(workspace: Workspace<S>) -> Self {
        Session { workspace }
    }

    fn view(&self) -> Value {
        json!({ "view": self.workspace.view() })
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        tracing::debug!(cmd = cmd_str, "request");

        let ws = &mut self.workspace;

        match Command::from(cmd_str) {
            Command::Ping => return ok(id, json!({ "message": "batchdiff-core alive" })),

            Command::StateGet => {}

            Command::RowsLoad => match parse_rows_from_payload(payload) {
                Ok(rows) => ws.load_rows(rows),
                Err(e) => return err(id, e),
            },

            Command::BatchSetSize => {
                let value = payload.get("value").unwrap_or(&Value::Null);
                ws.set_batch_size(batch::coerce_number(value));
            }

            Command::BatchSetIndex => {
                let value = payload.get("value").unwrap_or(&Value::Null);
                ws.set_batch_index(batch::coerce_number(value));
            }

            Command::BatchPrevious => ws.previous_batch(),

            Command::BatchNext => ws.next_batch(),

            Command::PayloadGenerate => {
                ws.generate_payload();
                return ok(
                    id,
                    json!({
                        "payloadJson": ws.payload_json(),
                        "view": ws.view()
                    }),
                );
            }

            Command::ResponseSet => match payload.get("text").and_then(|v| v.as_str()) {
                Some(text) => ws.set_response_text(text),
                None => return err(id, ProtocolError::Missing("text").to_string()),
            },

            Command::ResponseParse => ws.parse_response(),

            Command::ThemeToggle => ws.toggle_theme(),

            Command::ThemeSet => match parse_theme(payload) {
                Ok(theme) => ws.set_theme(theme),
                Err(e) => return err(id, e.to_string()),
            },

            Command::Unknown => {
                tracing::warn!(cmd = cmd_str, "unknown command");
                return err(id, "unknown command");
            }
        }

        ok(id, self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::environment::Environment;
    use crate::services::store::{FileStore, MemoryStore};
    use pretty_assertions::assert_eq;

    fn session() -> Session<MemoryStore> {
        Session::new(Workspace::new(MemoryStore::new(), Environment::headless()))
    }

    fn send(s: &mut Session<MemoryStore>, req: Value) -> Value {
        serde_json::from_str(&s.handle(&req.to_string())).unwrap()
    }

    fn load_sample(s: &mut Session<MemoryStore>) -> Value {
        send(
            s,
            json!({
                "id": 1,
                "cmd": "rows.load",
                "payload": { "rows": [
                    { "index": 1, "source": "a", "target": "hello world" },
                    { "index": 2, "source": "c", "target": "d" }
                ]}
            }),
        )
    }

    #[test]
    fn ping_and_errors() {
        let mut s = session();

        let resp = send(&mut s, json!({ "id": "x", "cmd": "ping" }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["id"], "x");

        let resp: Value = serde_json::from_str(&s.handle("not json")).unwrap();
        assert_eq!(resp["message"], "invalid json");

        let resp = send(&mut s, json!({ "id": 2, "cmd": "nope" }));
        assert_eq!(resp, json!({ "id": 2, "status": "error", "message": "unknown command" }));
    }

    #[test]
    fn load_rows_returns_view() {
        let mut s = session();
        let resp = load_sample(&mut s);

        assert_eq!(resp["status"], "ok");
        let view = &resp["payload"]["view"];
        assert_eq!(view["totalRows"], 2);
        assert_eq!(view["hasRows"], true);
        assert_eq!(view["batchRangeLabel"], "Showing rows 1–2 of 2");
        assert_eq!(view["isGenerateDisabled"], false);
        assert_eq!(view["isParseDisabled"], true);
        assert_eq!(view["currentBatch"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn rejects_bad_rows() {
        let mut s = session();

        let resp = send(&mut s, json!({ "id": 1, "cmd": "rows.load", "payload": {} }));
        assert_eq!(resp["message"], "payload.rows is required");

        let resp = send(
            &mut s,
            json!({ "id": 1, "cmd": "rows.load", "payload": { "rows": [{ "source": "x" }] } }),
        );
        assert!(resp["message"].as_str().unwrap().starts_with("invalid row at index 0"));
    }

    #[test]
    fn batch_inputs_accept_form_text() {
        let mut s = session();
        load_sample(&mut s);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "batch.set_size", "payload": { "value": "1" } }));
        assert_eq!(resp["payload"]["view"]["batchSize"], 1);
        assert_eq!(resp["payload"]["view"]["maxBatchIndex"], 2);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "batch.set_index", "payload": { "value": "9" } }));
        assert_eq!(resp["payload"]["view"]["batchIndex"], 2);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "batch.previous" }));
        assert_eq!(resp["payload"]["view"]["batchIndex"], 1);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "batch.next" }));
        assert_eq!(resp["payload"]["view"]["batchIndex"], 2);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "batch.set_size", "payload": { "value": "" } }));
        assert_eq!(resp["payload"]["view"]["batchSize"], 10);
        assert_eq!(resp["payload"]["view"]["batchIndex"], 1);
    }

    #[test]
    fn full_roundtrip() {
        let mut s = session();
        load_sample(&mut s);

        let resp = send(&mut s, json!({ "id": 1, "cmd": "payload.generate" }));
        let exported: Value =
            serde_json::from_str(resp["payload"]["payloadJson"].as_str().unwrap()).unwrap();
        assert_eq!(exported["meta"], json!({ "batchSize": 10, "batchIndex": 1, "totalRows": 2 }));
        assert_eq!(
            exported["rows"],
            json!([
                { "index": 1, "source": "a", "target": "hello world" },
                { "index": 2, "source": "c", "target": "d" }
            ])
        );

        send(
            &mut s,
            json!({
                "id": 2,
                "cmd": "response.set",
                "payload": { "text": r#"{"rows":[{"index":1,"target_revised":"hello there"}]}"# }
            }),
        );
        let resp = send(&mut s, json!({ "id": 3, "cmd": "response.parse" }));
        let view = &resp["payload"]["view"];

        assert_eq!(view["responseError"], "");
        assert_eq!(
            view["diffRows"],
            json!([{
                "index": 1,
                "originalTarget": "hello world",
                "revisedTarget": "hello there",
                "diffTokens": [
                    { "type": "equal", "text": "hello " },
                    { "type": "removed", "text": "world" },
                    { "type": "added", "text": "there" }
                ]
            }])
        );
    }

    #[test]
    fn response_set_requires_text() {
        let mut s = session();
        let resp = send(&mut s, json!({ "id": 1, "cmd": "response.set", "payload": { "text": 5 } }));
        assert_eq!(resp["message"], "payload.text is required");
    }

    #[test]
    fn theme_commands() {
        let mut s = session();

        let resp = send(&mut s, json!({ "id": 1, "cmd": "theme.toggle" }));
        assert_eq!(resp["payload"]["view"]["theme"], "dark");

        let resp = send(&mut s, json!({ "id": 1, "cmd": "theme.set", "payload": { "theme": "light" } }));
        assert_eq!(resp["payload"]["view"]["theme"], "light");

        let resp = send(&mut s, json!({ "id": 1, "cmd": "theme.set", "payload": { "theme": "blue" } }));
        assert_eq!(resp["status"], "error");
        assert!(resp["message"].as_str().unwrap().starts_with("invalid payload.theme"));
    }

    #[test]
    fn handler_panic_becomes_error_reply() {
        let resp: Value = serde_json::from_str(&guarded(|| panic!("boom"))).unwrap();
        assert_eq!(resp, json!({ "status": "error", "message": "internal core error" }));

        let resp = guarded(|| "fine".to_string());
        assert_eq!(resp, "fine");
    }

    #[test]
    fn file_backed_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let open = || {
            Session::new(Workspace::new(
                FileStore::open(&path).unwrap(),
                Environment::interactive(false),
            ))
        };

        let mut first = open();
        let resp: Value = serde_json::from_str(&guarded(|| {
            first.handle(
                &json!({
                    "id": 1,
                    "cmd": "rows.load",
                    "payload": { "rows": [
                        { "index": 1, "source": "a", "target": "hello world" },
                        { "index": 2, "source": "c", "target": "d" }
                    ]}
                })
                .to_string(),
            )
        }))
        .unwrap();
        assert_eq!(resp["status"], "ok");
        first.handle(&json!({ "id": 2, "cmd": "batch.set_size", "payload": { "value": 1 } }).to_string());
        first.handle(&json!({ "id": 3, "cmd": "batch.next" }).to_string());
        first.handle(&json!({ "id": 4, "cmd": "theme.toggle" }).to_string());
        let before: Value =
            serde_json::from_str(&first.handle(&json!({ "id": 5, "cmd": "state.get" }).to_string()))
                .unwrap();
        drop(first);

        let mut second = open();
        let after: Value =
            serde_json::from_str(&second.handle(&json!({ "id": 5, "cmd": "state.get" }).to_string()))
                .unwrap();

        assert_eq!(after, before);
        assert_eq!(after["payload"]["view"]["batchIndex"], 2);
        assert_eq!(after["payload"]["view"]["theme"], "dark");
        assert_eq!(after["payload"]["view"]["totalRows"], 2);
    }
}
