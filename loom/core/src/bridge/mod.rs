//! Session Bridge
//!
//! The session side of the duplex channel to one browser tab. Everything the
//! session wants the browser to do becomes a JavaScript statement queued on
//! the connection's writer task; everything the browser reports arrives as a
//! `.rui` object on the connection's reader task.
//!
//! # Design Philosophy
//!
//! - The bridge never touches the socket. It owns the sending half of an
//!   unbounded channel; the writer task owns the sink, so a slow browser
//!   never blocks a handler
//! - Getter-RPC answers are correlated by answer id in a map shared with the
//!   reader task. The reader completes the waiting future directly, which is
//!   what lets a handler's getter resolve while the session task is busy
//! - Statements are batched in two ways: a session-wide bracket
//!   ([`Bridge::begin_batch`]) collapsing a handler's output into one frame,
//!   and per-element update scripts that fold several attribute and style
//!   changes of one element into a single `getElementById` block

mod script;

pub use script::{call_func_script, quote, ScriptArg};

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::config::BridgeConfig;
use crate::data::DataObject;
use crate::error::LoomError;
use crate::transport::frame::check_outbound;
use crate::transport::ScriptBatch;

/// Getter-RPC waiters keyed by answer id, shared with the connection reader
pub type PendingAnswers = Arc<Mutex<HashMap<u64, oneshot::Sender<DataObject>>>>;

/// Future of a getter-RPC answer
///
/// Resolves to the browser's `answer{...}` object, or to an error object
/// carrying `errorText` when the call timed out or the bridge went away.
pub type Getter = BoxFuture<'static, DataObject>;

/// Tag of the object a failed getter resolves to
pub const ERROR_ANSWER: &str = "error";

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Outbound half of a browser connection
#[derive(Debug)]
pub struct Bridge {
    outbound: mpsc::UnboundedSender<String>,
    pending: PendingAnswers,
    next_answer: u64,
    config: BridgeConfig,
    batch: ScriptBatch,
    update_scripts: HashMap<String, String>,
    peer: String,
    connection: u64,
}

impl Bridge {
    /// Bridge writing to `outbound` and registering getters in `pending`
    #[must_use]
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        pending: PendingAnswers,
        config: BridgeConfig,
        peer: impl Into<String>,
    ) -> Self {
        Self {
            outbound,
            pending,
            next_answer: 0,
            config,
            batch: ScriptBatch::new(),
            update_scripts: HashMap::new(),
            peer: peer.into(),
            connection: NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique number of the connection this bridge writes to
    #[must_use]
    pub fn connection(&self) -> u64 {
        self.connection
    }

    /// Remote address of the tab
    #[must_use]
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Bridge settings
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Getter waiters shared with the connection reader
    #[must_use]
    pub fn pending(&self) -> &PendingAnswers {
        &self.pending
    }

    /// Whether the writer task is still running
    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }

    // ========================================================================
    // Raw output
    // ========================================================================

    fn send_frame(&self, frame: String) -> bool {
        if let Err(error) = check_outbound(&frame) {
            LoomError::from(error).log();
            return false;
        }
        if self.config.protocol_in_debug_log {
            tracing::trace!(peer = %self.peer, frame = %frame, "outbound");
        }
        if self.outbound.send(frame).is_err() {
            LoomError::BridgeDisconnected {
                operation: "write".to_string(),
            }
            .log();
            return false;
        }
        true
    }

    /// Queue a script, or add it to the open batch
    pub fn write_script(&mut self, script: &str) -> bool {
        if self.batch.is_open() {
            self.batch.push(script);
            true
        } else {
            self.send_frame(script.to_string())
        }
    }

    /// Queue `name(args...);`
    pub fn call_func(&mut self, name: &str, args: &[ScriptArg]) -> bool {
        let script = call_func_script(name, args);
        self.write_script(&script)
    }

    /// Open a session-wide batch; nested brackets collapse to the outermost
    pub fn begin_batch(&mut self) {
        self.batch.start();
    }

    /// Close a batch bracket, sending the collected frame at the outermost one
    pub fn end_batch(&mut self) {
        if let Some(frame) = self.batch.finish() {
            self.send_frame(frame);
        }
    }

    fn flush_batch(&mut self) {
        if let Some(frame) = self.batch.take() {
            self.send_frame(frame);
        }
    }

    // ========================================================================
    // DOM updates
    // ========================================================================

    /// Replace the content of an element
    pub fn update_inner_html(&mut self, html_id: &str, html: &str) {
        self.call_func("updateInnerHTML", &[html_id.into(), html.into()]);
    }

    /// Append to the content of an element
    pub fn append_to_inner_html(&mut self, html_id: &str, html: &str) {
        self.call_func("appendToInnerHTML", &[html_id.into(), html.into()]);
    }

    /// Set one inline style property of an element
    pub fn update_css_property(&mut self, html_id: &str, property: &str, value: &str) {
        if let Some(buffer) = self.update_scripts.get_mut(html_id) {
            let _ = writeln!(buffer, "element.style['{property}'] = {};", quote(value));
        } else {
            self.call_func(
                "updateCSSProperty",
                &[html_id.into(), property.into(), value.into()],
            );
        }
    }

    /// Set one attribute of an element
    pub fn update_property(&mut self, html_id: &str, property: &str, value: ScriptArg) {
        if let Some(buffer) = self.update_scripts.get_mut(html_id) {
            let _ = writeln!(buffer, "element.setAttribute('{property}', {});", value.to_js());
        } else {
            self.call_func("updateProperty", &[html_id.into(), property.into(), value]);
        }
    }

    /// Remove one attribute of an element
    pub fn remove_property(&mut self, html_id: &str, property: &str) {
        if let Some(buffer) = self.update_scripts.get_mut(html_id) {
            let _ = writeln!(
                buffer,
                "if (element.hasAttribute('{property}')) {{ element.removeAttribute('{property}');}}"
            );
        } else {
            self.call_func("removeProperty", &[html_id.into(), property.into()]);
        }
    }

    /// Start folding the updates of `html_id` into one block
    ///
    /// Returns `false` when a block for the element is already open; only the
    /// caller that got `true` may finish it.
    pub fn start_update_script(&mut self, html_id: &str) -> bool {
        if self.update_scripts.contains_key(html_id) {
            return false;
        }
        self.update_scripts.insert(html_id.to_string(), update_script_header(html_id));
        true
    }

    /// Close and queue the update block of `html_id`; an empty block is dropped
    pub fn finish_update_script(&mut self, html_id: &str) {
        if let Some(mut buffer) = self.update_scripts.remove(html_id) {
            if buffer.len() == update_script_header(html_id).len() {
                return;
            }
            buffer.push_str("scanElementsSize();\n}\n}\n");
            self.write_script(&buffer);
        }
    }

    /// Append rules to the `ruiAnimations` style element
    pub fn append_animation_css(&mut self, css: &str) {
        let script = format!(
            "{{\n\tlet styles = document.getElementById('ruiAnimations');\n\tif (styles) {{\n\t\tstyles.textContent += {};\n\t}}\n}}",
            quote(css)
        );
        self.write_script(&script);
    }

    /// Replace the content of the `ruiAnimations` style element
    pub fn set_animation_css(&mut self, css: &str) {
        let script = format!(
            "{{\n\tlet styles = document.getElementById('ruiAnimations');\n\tif (styles) {{\n\t\tstyles.textContent = {};\n\t}}\n}}",
            quote(css)
        );
        self.write_script(&script);
    }

    // ========================================================================
    // Getter-RPC
    // ========================================================================

    /// Call `func(answerID, args...)` in the browser and wait for its answer
    ///
    /// The call bypasses the batch (after flushing what the batch already
    /// holds, to keep statement order). The returned future does not borrow
    /// the bridge and can be awaited from any task.
    pub fn call_getter(&mut self, func: &str, args: &[ScriptArg]) -> Getter {
        let answer_id = self.next_answer;
        self.next_answer += 1;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(answer_id, tx);

        let mut call_args = Vec::with_capacity(args.len() + 1);
        call_args.push(ScriptArg::from(answer_id));
        call_args.extend_from_slice(args);

        self.flush_batch();
        if !self.send_frame(call_func_script(func, &call_args)) {
            self.pending.lock().remove(&answer_id);
            return ready_error(LoomError::BridgeDisconnected {
                operation: func.to_string(),
            });
        }

        let pending = Arc::clone(&self.pending);
        let timeout = self.config.getter_timeout();
        let timeout_ms = self.config.getter_timeout_ms;
        let function = func.to_string();
        async move {
            match tokio::time::timeout(timeout, rx).await {
                Ok(Ok(answer)) => answer,
                Ok(Err(_)) => error_answer(&LoomError::BridgeDisconnected { operation: function }),
                Err(_) => {
                    pending.lock().remove(&answer_id);
                    error_answer(&LoomError::GetterTimeout {
                        function,
                        answer_id,
                        timeout_ms,
                    })
                }
            }
        }
        .boxed()
    }

    /// Number of getters waiting for an answer
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Complete the getter waiting for `answer`
///
/// Called by the connection reader for every inbound `answer{answerID=N, ...}`.
pub fn deliver_answer(pending: &PendingAnswers, answer: DataObject) {
    let Some(text) = answer.property_value("answerID") else {
        tracing::error!("answer without answerID");
        return;
    };
    let Ok(answer_id) = text.parse::<u64>() else {
        tracing::error!(answer_id = %text, "invalid answerID");
        return;
    };
    let waiter = pending.lock().remove(&answer_id);
    match waiter {
        Some(waiter) => {
            if waiter.send(answer).is_err() {
                tracing::debug!(answer_id, "getter gave up before its answer arrived");
            }
        }
        None => tracing::error!(answer_id, "bad answerID (no waiting getter)"),
    }
}

/// Fail every waiting getter (the connection is gone)
pub fn fail_pending(pending: &PendingAnswers) {
    let waiters: Vec<_> = pending.lock().drain().collect();
    if !waiters.is_empty() {
        tracing::debug!(count = waiters.len(), "dropping pending getters");
    }
}

/// Error object a failed getter resolves to
#[must_use]
pub fn error_answer(error: &LoomError) -> DataObject {
    error.log();
    DataObject::new(ERROR_ANSWER).with("errorText", error.to_string().as_str())
}

/// Getter that has already failed
#[must_use]
pub fn ready_error(error: LoomError) -> Getter {
    let answer = error_answer(&error);
    futures::future::ready(answer).boxed()
}

/// Whether a getter answer is an error object
#[must_use]
pub fn is_error_answer(answer: &DataObject) -> bool {
    answer.tag() == ERROR_ANSWER && answer.property_value("errorText").is_some()
}

fn update_script_header(html_id: &str) -> String {
    format!("{{\nlet element = document.getElementById('{html_id}');\nif (element) {{\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge_with(config: BridgeConfig) -> (Bridge, mpsc::UnboundedReceiver<String>, PendingAnswers) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = PendingAnswers::default();
        (Bridge::new(tx, Arc::clone(&pending), config, "test"), rx, pending)
    }

    fn bridge() -> (Bridge, mpsc::UnboundedReceiver<String>, PendingAnswers) {
        bridge_with(BridgeConfig::default())
    }

    #[test]
    fn test_direct_calls() {
        let (mut bridge, mut rx, _) = bridge();
        bridge.update_css_property("id000002", "width", "10px");
        bridge.update_property("id000002", "data-disabled", "1".into());
        bridge.remove_property("id000002", "data-disabled");
        assert_eq!(rx.try_recv().unwrap(), "updateCSSProperty('id000002', 'width', '10px');");
        assert_eq!(rx.try_recv().unwrap(), "updateProperty('id000002', 'data-disabled', '1');");
        assert_eq!(rx.try_recv().unwrap(), "removeProperty('id000002', 'data-disabled');");
    }

    #[test]
    fn test_update_script_block() {
        let (mut bridge, mut rx, _) = bridge();
        assert!(bridge.start_update_script("id000004"));
        assert!(!bridge.start_update_script("id000004"));
        bridge.update_css_property("id000004", "opacity", "0.5");
        bridge.update_property("id000004", "tabindex", ScriptArg::Int(0));
        bridge.remove_property("id000004", "title");
        bridge.update_css_property("id000009", "width", "1px");
        bridge.finish_update_script("id000004");

        assert_eq!(rx.try_recv().unwrap(), "updateCSSProperty('id000009', 'width', '1px');");
        assert_eq!(
            rx.try_recv().unwrap(),
            "{\nlet element = document.getElementById('id000004');\nif (element) {\n\
             element.style['opacity'] = '0.5';\n\
             element.setAttribute('tabindex', 0);\n\
             if (element.hasAttribute('title')) { element.removeAttribute('title');}\n\
             scanElementsSize();\n}\n}\n"
        );
    }

    #[test]
    fn test_empty_update_script_is_dropped() {
        let (mut bridge, mut rx, _) = bridge();
        assert!(bridge.start_update_script("id000004"));
        bridge.finish_update_script("id000004");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_batch_collapses_into_one_frame() {
        let (mut bridge, mut rx, _) = bridge();
        bridge.begin_batch();
        bridge.call_func("a", &[]);
        bridge.begin_batch();
        bridge.call_func("b", &[]);
        bridge.end_batch();
        assert!(rx.try_recv().is_err());
        bridge.end_batch();
        assert_eq!(rx.try_recv().unwrap(), "a();\nb();\n");
    }

    #[tokio::test]
    async fn test_getter_answer_roundtrip() {
        let (mut bridge, mut rx, pending) = bridge();
        let getter = bridge.call_getter("getPropertyValue", &["id000003".into(), "currentTime".into()]);
        assert_eq!(
            rx.try_recv().unwrap(),
            "getPropertyValue(0, 'id000003', 'currentTime');"
        );
        assert_eq!(bridge.pending_count(), 1);

        deliver_answer(
            &pending,
            DataObject::parse("answer{answerID=0, value=12.5}").unwrap(),
        );
        let answer = getter.await;
        assert_eq!(answer.property_value("value"), Some("12.5"));
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_getter_pending_until_answer() {
        let (mut bridge, _rx, pending) = bridge();
        let mut getter = tokio_test::task::spawn(bridge.call_getter("canvasTextMetrics", &[]));
        tokio_test::assert_pending!(getter.poll());

        deliver_answer(&pending, DataObject::parse("answer{answerID=7, value=1}").unwrap());
        tokio_test::assert_pending!(getter.poll());
        assert!(!getter.is_woken());

        deliver_answer(&pending, DataObject::parse("answer{answerID=0, width=3}").unwrap());
        assert!(getter.is_woken());
        let answer = tokio_test::assert_ready!(getter.poll());
        assert_eq!(answer.property_value("width"), Some("3"));
    }

    #[tokio::test]
    async fn test_getter_flushes_open_batch_first() {
        let (mut bridge, mut rx, pending) = bridge();
        bridge.begin_batch();
        bridge.call_func("before", &[]);
        let getter = bridge.call_getter("canvasTextMetrics", &["id000001".into()]);
        assert_eq!(rx.try_recv().unwrap(), "before();\n");
        assert_eq!(rx.try_recv().unwrap(), "canvasTextMetrics(0, 'id000001');");
        fail_pending(&pending);
        assert!(is_error_answer(&getter.await));
        bridge.end_batch();
    }

    #[tokio::test]
    async fn test_getter_timeout_yields_error_object() {
        let config = BridgeConfig {
            getter_timeout_ms: 20,
            ..BridgeConfig::default()
        };
        let (mut bridge, _rx, _) = bridge_with(config);
        let answer = bridge.call_getter("getPropertyValue", &[]).await;
        assert!(is_error_answer(&answer));
        assert!(answer.property_value("errorText").unwrap().contains("timed out"));
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_getter_without_writer() {
        let (mut bridge, rx, _) = bridge();
        drop(rx);
        assert!(!bridge.is_connected());
        let answer = bridge.call_getter("getPropertyValue", &[]).await;
        assert!(is_error_answer(&answer));
        assert_eq!(bridge.pending_count(), 0);
    }

    #[test]
    fn test_animation_css_is_quoted() {
        let (mut bridge, mut rx, _) = bridge();
        bridge.append_animation_css("@keyframes kf1 {\n}");
        assert_eq!(
            rx.try_recv().unwrap(),
            "{\n\tlet styles = document.getElementById('ruiAnimations');\n\tif (styles) {\n\t\tstyles.textContent += '@keyframes kf1 {\\n}';\n\t}\n}"
        );
    }
}
