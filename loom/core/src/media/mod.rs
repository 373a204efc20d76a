//! Media players and images
//!
//! `AudioPlayer` and `VideoPlayer` views forward the DOM media events their
//! listeners ask for, and are driven from the server through `media*` client
//! helpers. Playback state lives in the browser only; reading it is a
//! getter-RPC.

mod images;

pub use images::{Image, ImageListener, ImageManager, ImageStatus};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::bridge::{is_error_answer, ScriptArg};
use crate::data::{parse_bool, DataObject};
use crate::error::{LoomError, LoomResult};
use crate::events::{MEDIA_NUMBER_EVENTS, MEDIA_PLAIN_EVENTS, PLAYER_ERROR_EVENT};
use crate::session::Session;
use crate::view::ViewId;

// ============================================================================
// Event bindings
// ============================================================================

/// DOM attribute that forwards one media event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventBinding {
    /// Event tag
    pub tag: &'static str,
    /// DOM handler attribute
    pub dom_event: &'static str,
    /// Dedicated client function; `None` uses `playerEvent(this, tag)`
    func: Option<&'static str>,
}

impl EventBinding {
    const fn plain(tag: &'static str, dom_event: &'static str) -> Self {
        Self {
            tag,
            dom_event,
            func: None,
        }
    }

    const fn with_func(tag: &'static str, dom_event: &'static str, func: &'static str) -> Self {
        Self {
            tag,
            dom_event,
            func: Some(func),
        }
    }

    /// JavaScript run by the attribute
    #[must_use]
    pub fn handler(&self) -> String {
        match self.func {
            Some(func) => format!("{func}(this)"),
            None => format!("playerEvent(this, '{}')", self.tag),
        }
    }

    /// `dom_event="handler"`
    #[must_use]
    pub fn attribute(&self) -> String {
        format!("{}=\"{}\"", self.dom_event, self.handler())
    }
}

/// Every forwarded media event
pub static EVENT_BINDINGS: &[EventBinding] = &[
    EventBinding::plain("abort-event", "onabort"),
    EventBinding::plain("can-play-event", "oncanplay"),
    EventBinding::plain("can-play-through-event", "oncanplaythrough"),
    EventBinding::plain("complete-event", "oncomplete"),
    EventBinding::plain("emptied-event", "onemptied"),
    EventBinding::plain("ended-event", "onended"),
    EventBinding::plain("loaded-data-event", "onloadeddata"),
    EventBinding::plain("loaded-metadata-event", "onloadedmetadata"),
    EventBinding::plain("load-start-event", "onloadstart"),
    EventBinding::plain("pause-event", "onpause"),
    EventBinding::plain("play-event", "onplay"),
    EventBinding::plain("playing-event", "onplaying"),
    EventBinding::plain("progress-event", "onprogress"),
    EventBinding::plain("seeked-event", "onseeked"),
    EventBinding::plain("seeking-event", "onseeking"),
    EventBinding::plain("stalled-event", "onstalled"),
    EventBinding::plain("suspend-event", "onsuspend"),
    EventBinding::plain("waiting-event", "onwaiting"),
    EventBinding::with_func("duration-changed-event", "ondurationchange", "playerDurationChangedEvent"),
    EventBinding::with_func("rate-changed-event", "onratechange", "playerRateChangedEvent"),
    EventBinding::with_func("time-update-event", "ontimeupdate", "playerTimeUpdatedEvent"),
    EventBinding::with_func("volume-changed-event", "onvolumechange", "playerVolumeChangedEvent"),
    EventBinding::with_func(PLAYER_ERROR_EVENT, "onerror", "playerErrorEvent"),
];

/// Binding of a media event tag
#[must_use]
pub fn binding(tag: &str) -> Option<&'static EventBinding> {
    EVENT_BINDINGS.iter().find(|binding| binding.tag == tag)
}

/// Whether `tag` is a media event
#[must_use]
pub fn is_media_event(tag: &str) -> bool {
    MEDIA_PLAIN_EVENTS.contains(&tag) || MEDIA_NUMBER_EVENTS.contains(&tag) || tag == PLAYER_ERROR_EVENT
}

// ============================================================================
// Player control
// ============================================================================

fn value_of(answer: &DataObject, property: &str) -> LoomResult<String> {
    if is_error_answer(answer) {
        return Err(LoomError::BridgeDisconnected {
            operation: property.to_string(),
        });
    }
    answer
        .property_value("value")
        .map(str::to_string)
        .ok_or_else(|| LoomError::invalid("answer", answer.to_string()))
}

fn number_of(answer: &DataObject, property: &str) -> LoomResult<f64> {
    let text = value_of(answer, property)?;
    match text.as_str() {
        "" | "NaN" | "undefined" => Ok(0.0),
        _ => text.parse().map_err(|_| LoomError::invalid("number", text)),
    }
}

fn flag_of(answer: &DataObject, property: &str) -> LoomResult<bool> {
    let text = value_of(answer, property)?;
    parse_bool(&text).ok_or_else(|| LoomError::invalid("bool", text))
}

impl Session {
    fn media_command(&mut self, func: &str, id: &ViewId, arg: Option<ScriptArg>) {
        let id = self.forward(id);
        if !self.view_kind(&id).is_some_and(crate::view::ViewKind::is_media) {
            tracing::warn!(view = %id, func, "media command on a view that is not a player");
            return;
        }
        let mut args = vec![ScriptArg::from(id.as_str())];
        args.extend(arg);
        self.command(func, |bridge| {
            bridge.call_func(func, &args);
        });
    }

    /// Start playback
    pub fn media_play(&mut self, id: &ViewId) {
        self.media_command("mediaPlay", id, None);
    }

    /// Pause playback
    pub fn media_pause(&mut self, id: &ViewId) {
        self.media_command("mediaPause", id, None);
    }

    /// Seek to `seconds`
    pub fn media_set_current_time(&mut self, id: &ViewId, seconds: f64) {
        self.media_command("mediaSetSetCurrentTime", id, Some(ScriptArg::from(seconds)));
    }

    /// Set the playback rate (1 is normal speed)
    pub fn media_set_playback_rate(&mut self, id: &ViewId, rate: f64) {
        self.media_command("mediaSetPlaybackRate", id, Some(ScriptArg::from(rate)));
    }

    /// Set the volume
    ///
    /// # Errors
    ///
    /// [`LoomError::InvalidFormat`] when `volume` is outside `0..=1`; nothing
    /// is sent then.
    pub fn media_set_volume(&mut self, id: &ViewId, volume: f64) -> LoomResult<()> {
        if !(0.0..=1.0).contains(&volume) {
            return Err(LoomError::invalid("volume", volume.to_string()));
        }
        self.media_command("mediaSetVolume", id, Some(ScriptArg::from(volume)));
        Ok(())
    }

    fn media_property(&mut self, id: &ViewId, property: &'static str) -> BoxFuture<'static, DataObject> {
        let id = self.forward(id);
        self.call_getter("getPropertyValue", &[ScriptArg::from(id.as_str()), ScriptArg::from(property)])
    }

    /// Playback position in seconds
    pub fn media_current_time(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<f64>> {
        self.media_property(id, "currentTime")
            .map(|answer| number_of(&answer, "currentTime"))
            .boxed()
    }

    /// Length of the media in seconds
    pub fn media_duration(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<f64>> {
        self.media_property(id, "duration")
            .map(|answer| number_of(&answer, "duration"))
            .boxed()
    }

    /// Current playback rate
    pub fn media_playback_rate(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<f64>> {
        self.media_property(id, "playbackRate")
            .map(|answer| number_of(&answer, "playbackRate"))
            .boxed()
    }

    /// Current volume
    pub fn media_volume(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<f64>> {
        self.media_property(id, "volume")
            .map(|answer| number_of(&answer, "volume"))
            .boxed()
    }

    /// Whether playback reached the end
    pub fn media_is_ended(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<bool>> {
        self.media_property(id, "ended")
            .map(|answer| flag_of(&answer, "ended"))
            .boxed()
    }

    /// Whether playback is paused
    pub fn media_is_paused(&mut self, id: &ViewId) -> BoxFuture<'static, LoomResult<bool>> {
        self.media_property(id, "paused")
            .map(|answer| flag_of(&answer, "paused"))
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::events::EventListener;
    use crate::session::test_support::{connected_session, drain};
    use crate::view::ViewKind;

    #[test]
    fn test_bindings_cover_media_events() {
        for tag in MEDIA_PLAIN_EVENTS.iter().chain(MEDIA_NUMBER_EVENTS) {
            assert!(binding(tag).is_some(), "{tag}");
        }
        assert_eq!(binding("play-event").unwrap().attribute(), "onplay=\"playerEvent(this, 'play-event')\"");
        assert_eq!(binding("time-update-event").unwrap().handler(), "playerTimeUpdatedEvent(this)");
        assert!(binding("click-event").is_none());
        assert!(is_media_event(PLAYER_ERROR_EVENT));
    }

    #[test]
    fn test_player_html_binds_listened_events() {
        let (mut session, mut rx) = connected_session();
        let player = session.create_view(ViewKind::VideoPlayer);
        session.set(&player, "ended-event", vec![EventListener::<()>::no_args(|| {})]);
        session.set_root_view(&player);
        let out = drain(&mut rx);
        assert!(out.contains("onended=\"playerEvent(this, \\'ended-event\\')\""), "{out}");
        assert!(!out.contains("onplay="), "{out}");
    }

    #[test]
    fn test_commands() {
        let (mut session, mut rx) = connected_session();
        let player = session.create_view(ViewKind::AudioPlayer);
        session.media_play(&player);
        session.media_set_current_time(&player, 12.5);
        assert!(session.media_set_volume(&player, 2.0).is_err());
        assert_eq!(
            drain(&mut rx),
            "mediaPlay('id000001');\nmediaSetSetCurrentTime('id000001', 12.5);"
        );

        let text = session.create_view(ViewKind::TextView);
        session.media_pause(&text);
        assert_eq!(drain(&mut rx), "");
    }

    #[tokio::test]
    async fn test_getters_parse_answers() {
        let (mut session, mut rx) = connected_session();
        let player = session.create_view(ViewKind::AudioPlayer);
        let time = session.media_current_time(&player);
        let paused = session.media_is_paused(&player);
        let out = drain(&mut rx);
        assert!(out.contains("getPropertyValue(0, 'id000001', 'currentTime');"), "{out}");
        assert!(out.contains("getPropertyValue(1, 'id000001', 'paused');"), "{out}");

        session.handle_message(&DataObject::parse("answer{answerID=0, value=3.25}").unwrap());
        session.handle_message(&DataObject::parse("answer{answerID=1, value=true}").unwrap());
        assert!((time.await.unwrap() - 3.25).abs() < f64::EPSILON);
        assert!(paused.await.unwrap());
    }

    #[tokio::test]
    async fn test_getter_without_bridge_fails() {
        let mut session = Session::new(9, Arc::new(crate::resources::Resources::new()));
        let player = session.create_view(ViewKind::VideoPlayer);
        assert!(session.media_duration(&player).await.is_err());
    }

    #[test]
    fn test_number_event_reaches_listener() {
        let (mut session, _rx) = connected_session();
        let player = session.create_view(ViewKind::VideoPlayer);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set(
            &player,
            "volume-changed-event",
            vec![EventListener::<f64>::event_only(move |volume| sink.lock().push(*volume))],
        );
        session.handle_message(&DataObject::parse("volume-changed-event{id=id000001, value=0.5}").unwrap());
        assert_eq!(*seen.lock(), vec![0.5]);
    }
}
