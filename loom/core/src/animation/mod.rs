//! Transitions and keyframe animations
//!
//! One descriptor type, [`Animation`], serves both uses:
//!
//! - as a **transition** it is stored per property tag in the view's
//!   `transition` map (or installed for a single `set_animated` call) and
//!   only `duration`, `timing-function` and `delay` matter
//! - as a **keyframe animation** it carries [`AnimatedProperty`] tracks and
//!   renders to an `@keyframes` rule plus an `animation` value
//!
//! # Design Philosophy
//!
//! - Descriptors are plain property bags, built from params, `.rui` objects
//!   or text exactly like the composite style values
//! - Keyframe names are derived from the rendered frames, so two views
//!   animating the same frames share one `@keyframes` rule in the page
//! - Frame declarations go through the same CSS projection as view styles

mod timing;

pub use timing::{
    cubic_bezier_timing, is_valid_timing, steps_timing, EASE_IN_OUT_TIMING, EASE_IN_TIMING,
    EASE_OUT_TIMING, EASE_TIMING, LINEAR_TIMING,
};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::data::DataObject;
use crate::error::{LoomError, LoomResult};
use crate::properties::enums::ANIMATION_DIRECTION;
use crate::properties::resolve::{enum_value, float_value, int_value, resolve_text, text_value};
use crate::properties::{
    normalize_view_tag, ConstantResolver, NoConstants, Params, Properties, PropertyBag, PropertyKind,
    PropertyMap, PropertyValue,
};
use crate::session::Session;
use crate::style::view_style_css;
use crate::values::format_float;
use crate::view::ViewId;

// ============================================================================
// Tags
// ============================================================================

/// Animation identifier, used in diagnostics and listener payloads
pub const ID: &str = "id";
/// Duration in seconds
pub const DURATION: &str = "duration";
/// Delay before start, in seconds
pub const DELAY: &str = "delay";
/// Timing function, see [`is_valid_timing`]
pub const TIMING_FUNCTION: &str = "timing-function";
/// Number of cycles, negative for infinite
pub const ITERATION_COUNT: &str = "iteration-count";
/// `normal`, `reverse`, `alternate`, `alternate-reverse`
pub const ANIMATION_DIRECTION_TAG: &str = "animation-direction";
/// Animated property tracks
pub const PROPERTY: &str = "property";

fn leaf_kind(tag: &str) -> Option<PropertyKind> {
    match tag {
        ID => Some(PropertyKind::Text),
        DURATION | DELAY => Some(PropertyKind::Float),
        ITERATION_COUNT => Some(PropertyKind::Int),
        ANIMATION_DIRECTION_TAG => Some(PropertyKind::Enum(&ANIMATION_DIRECTION)),
        _ => None,
    }
}

// ============================================================================
// Finish listener
// ============================================================================

type FinishCallback = dyn Fn(&mut Session, &ViewId, &str) + Send + Sync;

/// Called with the view and the property tag once an animated set completes
#[derive(Clone)]
pub struct FinishListener(Arc<FinishCallback>);

impl FinishListener {
    /// Wrap a callback
    pub fn new(listener: impl Fn(&mut Session, &ViewId, &str) + Send + Sync + 'static) -> Self {
        Self(Arc::new(listener))
    }

    /// Invoke the callback
    pub fn call(&self, session: &mut Session, view: &ViewId, tag: &str) {
        (self.0)(session, view, tag);
    }
}

impl PartialEq for FinishListener {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FinishListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FinishListener({:p})", Arc::as_ptr(&self.0))
    }
}

// ============================================================================
// Animated property tracks
// ============================================================================

/// One animated property of a keyframe animation
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedProperty {
    /// Canonical view tag
    pub tag: String,
    /// Value at 0%
    pub from: PropertyValue,
    /// Value at 100%
    pub to: PropertyValue,
    /// Intermediate values keyed by percent (1..=99)
    pub key_frames: BTreeMap<u8, PropertyValue>,
}

impl AnimatedProperty {
    /// Track from `from` to `to`
    ///
    /// Both values must be accepted by a view for `tag`.
    pub fn new(
        tag: &str,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> LoomResult<Self> {
        let tag = normalize_view_tag(tag);
        let from = from.into();
        let to = to.into();
        check_view_value(&tag, &from)?;
        check_view_value(&tag, &to)?;
        Ok(Self {
            tag,
            from,
            to,
            key_frames: BTreeMap::new(),
        })
    }

    /// Add an intermediate value at `percent`
    pub fn with_key_frame(mut self, percent: u8, value: impl Into<PropertyValue>) -> LoomResult<Self> {
        if percent == 0 || percent >= 100 {
            return Err(LoomError::OutOfRange {
                tag: "key-frames".to_string(),
                index: i64::from(percent),
                len: 100,
            });
        }
        let value = value.into();
        check_view_value(&self.tag, &value)?;
        self.key_frames.insert(percent, value);
        Ok(self)
    }

    fn from_params(params: Params) -> LoomResult<Self> {
        let text = |tag: &str| params.get(tag).and_then(PropertyValue::as_text).map(str::to_string);
        let tag = text("tag").ok_or_else(|| LoomError::invalid("animated property", "missing tag"))?;
        let value = |name: &str| {
            params
                .get(name)
                .cloned()
                .ok_or_else(|| LoomError::invalid("animated property", format!("{tag}: missing {name}")))
        };
        let mut property = Self::new(&tag, value("from")?, value("to")?)?;

        let frames = match params.get("key-frames") {
            Some(PropertyValue::Params(frames)) => frames.clone(),
            Some(PropertyValue::Object(object)) => Params::from_object(object),
            Some(other) => return Err(LoomError::incompatible("key-frames", other)),
            None => Params::new(),
        };
        for (percent, value) in frames {
            let percent = percent
                .trim_end_matches('%')
                .parse::<u8>()
                .map_err(|_| LoomError::invalid("key frame", percent.clone()))?;
            property = property.with_key_frame(percent, value)?;
        }
        Ok(property)
    }

    fn build(value: PropertyValue) -> LoomResult<Self> {
        match value {
            PropertyValue::Params(params) => Self::from_params(params),
            PropertyValue::Object(object) => Self::from_params(Params::from_object(&object)),
            PropertyValue::Text(text) => Self::from_params(Params::from_object(&DataObject::parse(&text)?)),
            other => Err(LoomError::incompatible(PROPERTY, &other)),
        }
    }

    /// `.rui` form of the track
    #[must_use]
    pub fn to_object(&self) -> DataObject {
        let text = |value: &PropertyValue| match value {
            PropertyValue::Text(text) => text.clone(),
            other => text_value(other, &NoConstants).unwrap_or_default(),
        };
        let mut object = DataObject::new("_")
            .with("tag", self.tag.as_str())
            .with("from", text(&self.from).as_str())
            .with("to", text(&self.to).as_str());
        if !self.key_frames.is_empty() {
            let mut frames = DataObject::new("_");
            for (percent, value) in &self.key_frames {
                frames.set_property_value(format!("{percent}%"), text(value));
            }
            object.set_property_object("key-frames", frames);
        }
        object
    }
}

fn check_view_value(tag: &str, value: &PropertyValue) -> LoomResult<()> {
    PropertyBag::new().apply(tag, Some(value.clone())).map(|_| ())
}

// ============================================================================
// Animation
// ============================================================================

/// Transition or keyframe animation descriptor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    map: PropertyMap,
    timing: Option<String>,
    properties: Vec<AnimatedProperty>,
    finish: Option<FinishListener>,
}

/// `@keyframes` rule of an animation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keyframes {
    /// Rule name, derived from the frames
    pub name: String,
    /// Complete `@keyframes name { ... }` rule
    pub rule: String,
}

impl Animation {
    /// Transition descriptor
    #[must_use]
    pub fn transition(duration: f64, timing_function: &str) -> Self {
        let mut animation = Self::default();
        animation.map.insert(DURATION, PropertyValue::Float(duration));
        if !timing_function.is_empty() {
            animation.timing = Some(timing_function.to_string());
        }
        animation
    }

    /// Keyframe animation over `properties`
    #[must_use]
    pub fn keyframes(properties: Vec<AnimatedProperty>, duration: f64) -> Self {
        let mut animation = Self::transition(duration, "");
        animation.properties = properties;
        animation
    }

    /// Builder: delay in seconds
    #[must_use]
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.map.insert(DELAY, PropertyValue::Float(delay));
        self
    }

    /// Builder: iteration count, negative for infinite
    #[must_use]
    pub fn with_iterations(mut self, count: i64) -> Self {
        self.map.insert(ITERATION_COUNT, PropertyValue::Int(count));
        self
    }

    /// Builder: callback for the end of an animated set
    #[must_use]
    pub fn on_finish(mut self, listener: impl Fn(&mut Session, &ViewId, &str) + Send + Sync + 'static) -> Self {
        self.finish = Some(FinishListener::new(listener));
        self
    }

    /// Finish listener, if any
    #[must_use]
    pub fn finish_listener(&self) -> Option<&FinishListener> {
        self.finish.as_ref()
    }

    /// Animated property tracks
    #[must_use]
    pub fn animated_properties(&self) -> &[AnimatedProperty] {
        &self.properties
    }

    /// Build from a ready descriptor, params, a `.rui` object or its text
    pub fn build(tag: &str, value: PropertyValue) -> LoomResult<Self> {
        let params = match value {
            PropertyValue::Animation(animation) => return Ok(*animation),
            PropertyValue::Params(params) => params,
            PropertyValue::Object(object) => Params::from_object(&object),
            PropertyValue::Text(text) => Params::from_object(&DataObject::parse(&text)?),
            other => return Err(LoomError::incompatible(tag, &other)),
        };
        let mut animation = Self::default();
        for (leaf, value) in params {
            animation.set_value(&leaf, value)?;
        }
        Ok(animation)
    }

    // ========================================================================
    // Resolved values
    // ========================================================================

    /// Duration in seconds
    #[must_use]
    pub fn duration(&self, resolver: &dyn ConstantResolver) -> Option<f64> {
        self.map.get(DURATION).and_then(|v| float_value(v, resolver))
    }

    /// Delay in seconds
    #[must_use]
    pub fn delay(&self, resolver: &dyn ConstantResolver) -> f64 {
        self.map
            .get(DELAY)
            .and_then(|v| float_value(v, resolver))
            .unwrap_or(0.0)
    }

    /// Resolved timing function, `None` when the reference or the text is invalid
    #[must_use]
    pub fn timing_function(&self, resolver: &dyn ConstantResolver) -> Option<String> {
        let Some(timing) = &self.timing else {
            return Some(String::new());
        };
        let text = resolve_text(timing, resolver)?;
        is_valid_timing(&text).then(|| text.trim().to_string())
    }

    /// Whether an animated set with this descriptor actually animates
    #[must_use]
    pub fn is_animating(&self, resolver: &dyn ConstantResolver) -> bool {
        self.duration(resolver).is_some_and(|d| d > 0.0) && self.timing_function(resolver).is_some()
    }

    // ========================================================================
    // CSS
    // ========================================================================

    /// One entry of a `transition` value: `property dur [timing] [delay]`
    #[must_use]
    pub fn transition_css(&self, tag: &str, resolver: &dyn ConstantResolver) -> String {
        let mut text = format!(
            "{} {}s",
            transition_property(tag),
            format_float(self.duration(resolver).unwrap_or(0.0))
        );
        let timing = self.timing_function(resolver).unwrap_or_default();
        if !timing.is_empty() {
            text.push(' ');
            text.push_str(&timing);
        }
        let delay = self.delay(resolver);
        if delay > 0.0 {
            if timing.is_empty() {
                text.push_str(" ease");
            }
            text.push_str(&format!(" {}s", format_float(delay)));
        }
        text
    }

    /// `@keyframes` rule, `None` without animated properties
    #[must_use]
    pub fn keyframes_rule(&self, resolver: &dyn ConstantResolver) -> Option<Keyframes> {
        if self.properties.is_empty() {
            return None;
        }
        let mut percents: Vec<u8> = vec![0, 100];
        for property in &self.properties {
            percents.extend(property.key_frames.keys().copied());
        }
        percents.sort_unstable();
        percents.dedup();

        let empty = BTreeMap::new();
        let mut body = String::new();
        for percent in percents {
            let mut frame = PropertyBag::new();
            for property in &self.properties {
                let value = match percent {
                    0 => Some(&property.from),
                    100 => Some(&property.to),
                    p => property.key_frames.get(&p),
                };
                if let Some(value) = value {
                    if let Err(error) = frame.apply(&property.tag, Some(value.clone())) {
                        error.log();
                    }
                }
            }
            let css = view_style_css(&frame, &empty, resolver).finish();
            if !css.is_empty() {
                body.push_str(&format!("  {percent}% {{ {css} }}\n"));
            }
        }

        let name = format!("kf{:08x}", crc32fast::hash(body.as_bytes()));
        let rule = format!("@keyframes {name} {{\n{body}}}");
        Some(Keyframes { name, rule })
    }

    /// One entry of an `animation` value:
    /// `name dur timing delay count direction`
    #[must_use]
    pub fn animation_css(&self, resolver: &dyn ConstantResolver) -> Option<String> {
        let keyframes = self.keyframes_rule(resolver)?;
        let duration = self.duration(resolver).filter(|d| *d > 0.0).unwrap_or(1.0);
        let timing = self
            .timing_function(resolver)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EASE_TIMING.to_string());
        let count = self
            .map
            .get(ITERATION_COUNT)
            .and_then(|v| int_value(v, resolver))
            .unwrap_or(1);
        let count = match count {
            n if n < 0 => "infinite".to_string(),
            0 => "1".to_string(),
            n => n.to_string(),
        };
        let direction = self
            .map
            .get(ANIMATION_DIRECTION_TAG)
            .and_then(|v| enum_value(v, &ANIMATION_DIRECTION, resolver))
            .unwrap_or(0);
        Some(format!(
            "{} {}s {} {}s {} {}",
            keyframes.name,
            format_float(duration),
            timing,
            format_float(self.delay(resolver)),
            count,
            ANIMATION_DIRECTION.css_value(direction)
        ))
    }

    /// Identifier text
    #[must_use]
    pub fn id(&self, resolver: &dyn ConstantResolver) -> Option<String> {
        self.map.get(ID).and_then(|v| text_value(v, resolver))
    }
}

/// `transition` value of a property map, entries joined by `, `
#[must_use]
pub fn transitions_css(transitions: &BTreeMap<String, Animation>, resolver: &dyn ConstantResolver) -> String {
    transitions
        .iter()
        .map(|(tag, animation)| animation.transition_css(tag, resolver))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `animation` value of a keyframe animation list
#[must_use]
pub fn animations_css(animations: &[Animation], resolver: &dyn ConstantResolver) -> String {
    animations
        .iter()
        .filter_map(|animation| animation.animation_css(resolver))
        .collect::<Vec<_>>()
        .join(", ")
}

/// CSS property animated by a transition on `tag`
#[must_use]
pub fn transition_property(tag: &str) -> String {
    let tag = normalize_view_tag(tag);
    let css = match tag.as_str() {
        "text-color" => "color",
        "text-size" => "font-size",
        "text-line-color" => "text-decoration-color",
        "text-line-thickness" => "text-decoration-thickness",
        "shadow" => "box-shadow",
        "column-separator" => "column-rule",
        "font-name" => "font-family",
        "transform-origin-x" | "transform-origin-y" | "transform-origin-z" => "transform-origin",
        "perspective-origin-x" | "perspective-origin-y" => "perspective-origin",
        t if t == "radius" || t.starts_with("radius-") => "border-radius",
        "transform" | "perspective" | "translate-x" | "translate-y" | "translate-z" | "scale-x"
        | "scale-y" | "scale-z" | "rotate" | "rotate-x" | "rotate-y" | "rotate-z" | "skew-x"
        | "skew-y" => "transform",
        _ => return tag,
    };
    css.to_string()
}

impl Properties for Animation {
    fn owner(&self) -> &'static str {
        "animation"
    }

    fn normalize(&self, tag: &str) -> String {
        let tag = tag.trim().to_ascii_lowercase();
        match tag.as_str() {
            "direction" => ANIMATION_DIRECTION_TAG.to_string(),
            "timing" => TIMING_FUNCTION.to_string(),
            "properties" => PROPERTY.to_string(),
            _ => tag,
        }
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        let tag = self.normalize(tag);
        match tag.as_str() {
            TIMING_FUNCTION => self.timing.clone().map(PropertyValue::Text),
            PROPERTY => (!self.properties.is_empty()).then(|| {
                PropertyValue::Objects(self.properties.iter().map(AnimatedProperty::to_object).collect())
            }),
            _ => self.map.get(&tag).cloned(),
        }
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        let tag = self.normalize(tag);
        match tag.as_str() {
            TIMING_FUNCTION => {
                let text = match value {
                    PropertyValue::Text(text) => text,
                    other => return Err(LoomError::incompatible(&tag, &other)),
                };
                if !text.starts_with('@') && !is_valid_timing(&text) {
                    return Err(LoomError::invalid("timing function", text));
                }
                self.timing = Some(text.trim().to_string());
                Ok(())
            }
            PROPERTY => {
                self.properties = match value {
                    PropertyValue::Objects(objects) => objects
                        .into_iter()
                        .map(|object| AnimatedProperty::build(PropertyValue::Object(object)))
                        .collect::<LoomResult<_>>()?,
                    other => vec![AnimatedProperty::build(other)?],
                };
                Ok(())
            }
            _ => match leaf_kind(&tag) {
                Some(kind) => self.map.set_typed(&tag, kind, value),
                None => Err(LoomError::unknown_tag(&tag, "animation")),
            },
        }
    }

    fn remove(&mut self, tag: &str) {
        let tag = self.normalize(tag);
        match tag.as_str() {
            TIMING_FUNCTION => self.timing = None,
            PROPERTY => self.properties.clear(),
            _ => {
                self.map.remove(&tag);
            }
        }
    }

    fn all_tags(&self) -> Vec<String> {
        let mut tags = self.map.tags();
        if self.timing.is_some() {
            tags.push(TIMING_FUNCTION.to_string());
        }
        if !self.properties.is_empty() {
            tags.push(PROPERTY.to_string());
        }
        tags
    }

    fn clear(&mut self) {
        self.map.clear();
        self.timing = None;
        self.properties.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::SizeUnit;

    #[test]
    fn test_transition_css_forms() {
        let plain = Animation::transition(0.5, "");
        assert_eq!(plain.transition_css("width", &NoConstants), "width 0.5s");

        let delayed = Animation::transition(1.0, "").with_delay(0.25);
        assert_eq!(delayed.transition_css("opacity", &NoConstants), "opacity 1s ease 0.25s");

        let timed = Animation::transition(2.0, "linear");
        assert_eq!(timed.transition_css("translate-x", &NoConstants), "transform 2s linear");
    }

    #[test]
    fn test_invalid_timing_does_not_animate() {
        let mut animation = Animation::transition(1.0, "");
        assert!(animation.is_animating(&NoConstants));
        assert!(!animation.set("timing-function", "wobble"));
        animation.timing = Some("@missing".to_string());
        assert!(!animation.is_animating(&NoConstants));
        assert!(!Animation::transition(0.0, "ease").is_animating(&NoConstants));
    }

    #[test]
    fn test_build_from_object() {
        let animation = Animation::build(
            "transition",
            PropertyValue::Text("_{duration = 1.5, timing-function = ease-out, delay = 1}".into()),
        )
        .unwrap();
        assert_eq!(animation.duration(&NoConstants), Some(1.5));
        assert_eq!(animation.timing_function(&NoConstants).as_deref(), Some("ease-out"));
        assert_eq!(animation.delay(&NoConstants), 1.0);
        assert!(Animation::build("transition", PropertyValue::Text("_{speed = 2}".into())).is_err());
    }

    #[test]
    fn test_keyframes_rule_and_value() {
        let track = AnimatedProperty::new("width", SizeUnit::px(10.0), SizeUnit::px(100.0))
            .unwrap()
            .with_key_frame(50, SizeUnit::px(80.0))
            .unwrap();
        let animation = Animation::keyframes(vec![track], 2.0).with_iterations(-1);

        let keyframes = animation.keyframes_rule(&NoConstants).unwrap();
        assert!(keyframes.name.starts_with("kf"));
        assert!(keyframes.rule.contains("0% { width: 10px; }"));
        assert!(keyframes.rule.contains("50% { width: 80px; }"));
        assert!(keyframes.rule.contains("100% { width: 100px; }"));
        assert_eq!(
            animation.animation_css(&NoConstants),
            Some(format!("{} 2s ease 0s infinite normal", keyframes.name))
        );

        let same = animation.clone().with_delay(1.0);
        assert_eq!(same.keyframes_rule(&NoConstants).unwrap().name, keyframes.name);
    }

    #[test]
    fn test_animated_property_validation() {
        assert!(AnimatedProperty::new("width", "10px", "wide").is_err());
        assert!(AnimatedProperty::new("no-such-tag", 1, 2).is_err());
        let track = AnimatedProperty::new("opacity", 0.0, 1.0).unwrap();
        assert!(track.with_key_frame(100, 0.5).is_err());
    }

    #[test]
    fn test_property_tracks_from_text() {
        let animation = Animation::build(
            "animation",
            PropertyValue::Text(
                "_{duration = 1, property = [_{tag = opacity, from = 0, to = 1, key-frames = _{ 30% = 0.8 }}]}"
                    .into(),
            ),
        )
        .unwrap();
        let tracks = animation.animated_properties();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].key_frames.len(), 1);
        assert!(animation.get("property").is_some());
    }
}
