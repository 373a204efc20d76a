//! The view property bag
//!
//! Stores canonical values keyed by normalized view tag and reports which
//! tags observably changed on every mutation. Views and theme styles share
//! this bag; composite families are delegated to their [`SubProperty`] bags.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::animation::Animation;
use crate::error::{LoomError, LoomResult};
use crate::events::ListenerList;
use crate::session::Session;
use crate::style::{
    BackgroundElement, BorderProperty, BoundsProperty, ColumnSeparatorProperty, FilterProperty,
    OutlineProperty, RadiusProperty, ShadowProperty, TransformProperty,
};
use crate::view::ViewId;

use super::coerce::coerce;
use super::schema::{normalize_view_tag, view_property_kind, CompositeKind, PropertyKind};
use super::value::{Params, PropertyValue};
use super::{Properties, SubProperty};

/// Post-commit callback registered for one tag
pub type ChangeListener = Arc<dyn Fn(&mut Session, &ViewId, &str) + Send + Sync>;

const BOUNDS_SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

macro_rules! composite {
    ($kind:expr, |$s:ident| $body:expr) => {
        match $kind {
            CompositeKind::Border => {
                type $s = BorderProperty;
                $body
            }
            CompositeKind::Radius => {
                type $s = RadiusProperty;
                $body
            }
            CompositeKind::Outline => {
                type $s = OutlineProperty;
                $body
            }
            CompositeKind::Transform => {
                type $s = TransformProperty;
                $body
            }
            CompositeKind::Filter => {
                type $s = FilterProperty;
                $body
            }
            CompositeKind::ColumnSeparator => {
                type $s = ColumnSeparatorProperty;
                $body
            }
        }
    };
}

/// Tag-keyed storage of a view or a style
#[derive(Clone, Default)]
pub struct PropertyBag {
    values: BTreeMap<String, PropertyValue>,
    change_listeners: HashMap<String, ChangeListener>,
}

impl PropertyBag {
    /// Empty bag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value of a canonical tag, without composite or bounds lookup
    #[must_use]
    pub fn get_raw(&self, tag: &str) -> Option<&PropertyValue> {
        self.values.get(tag)
    }

    /// Stored `(tag, value)` pairs in tag order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(t, v)| (t.as_str(), v))
    }

    /// Listeners of an event tag
    #[must_use]
    pub fn listeners(&self, tag: &str) -> Option<&ListenerList> {
        match self.values.get(tag) {
            Some(PropertyValue::Listeners(list)) => Some(list),
            _ => None,
        }
    }

    /// Register (or with `None` drop) the change listener of `tag`
    pub fn set_change_listener(&mut self, tag: &str, listener: Option<ChangeListener>) {
        let tag = normalize_view_tag(tag);
        match listener {
            Some(listener) => {
                self.change_listeners.insert(tag, listener);
            }
            None => {
                self.change_listeners.remove(&tag);
            }
        }
    }

    /// Change listener of a canonical tag
    #[must_use]
    pub fn change_listener(&self, tag: &str) -> Option<ChangeListener> {
        self.change_listeners.get(tag).cloned()
    }

    /// Set (`Some`) or remove (`None`) a tag
    ///
    /// Returns the canonical tags that observably changed, in order. Setting a
    /// value equal to the stored one returns an empty list. On error the bag
    /// is unchanged.
    pub fn apply(&mut self, tag: &str, value: Option<PropertyValue>) -> LoomResult<Vec<String>> {
        let tag = normalize_view_tag(tag);
        let kind = view_property_kind(&tag).ok_or_else(|| LoomError::unknown_tag(&tag, "view"))?;
        match value {
            None => Ok(self.remove_tag(&tag, kind)),
            Some(value) => self.set_tag(&tag, kind, value),
        }
    }

    fn store(&mut self, tag: &str, value: Option<PropertyValue>) -> bool {
        match value {
            Some(value) => {
                if self.values.get(tag) == Some(&value) {
                    return false;
                }
                self.values.insert(tag.to_string(), value);
                true
            }
            None => self.values.remove(tag).is_some(),
        }
    }

    fn set_tag(&mut self, tag: &str, kind: PropertyKind, value: PropertyValue) -> LoomResult<Vec<String>> {
        let stored = match kind {
            PropertyKind::Bounds => return self.set_bounds(tag, value),
            PropertyKind::Leaf(composite) => return self.set_leaf(tag, composite, value),
            PropertyKind::Composite(composite) => {
                Some(composite!(composite, |S| S::build(tag, value).map(S::into_value))?)
                    .filter(|value| !composite_is_empty(composite, value))
            }
            PropertyKind::Shadows => {
                Some(PropertyValue::Shadows(build_list(tag, value, |v| match v {
                    PropertyValue::Shadows(list) => Ok(list),
                    other => Err(other),
                }, ShadowProperty::build)?))
            }
            PropertyKind::Background => Some(PropertyValue::Background(build_list(
                tag,
                value,
                |v| match v {
                    PropertyValue::Background(list) => Ok(list),
                    other => Err(other),
                },
                BackgroundElement::build,
            )?)),
            PropertyKind::Animations => Some(PropertyValue::Animations(build_list(
                tag,
                value,
                |v| match v {
                    PropertyValue::Animations(list) => Ok(list),
                    PropertyValue::Animation(animation) => Ok(vec![*animation]),
                    other => Err(other),
                },
                Animation::build,
            )?)),
            PropertyKind::Transitions => Some(PropertyValue::Transitions(build_transitions(tag, value)?)),
            PropertyKind::Listener(payload) => match value {
                PropertyValue::Listeners(list) if list.kind() == payload => Some(PropertyValue::Listeners(list)),
                other => return Err(LoomError::incompatible(tag, &other)),
            },
            PropertyKind::Views => match value {
                PropertyValue::Views(views) => Some(PropertyValue::Views(views)),
                other => return Err(LoomError::incompatible(tag, &other)),
            },
            PropertyKind::Object => match value {
                value @ (PropertyValue::Params(_)
                | PropertyValue::Object(_)
                | PropertyValue::Objects(_)
                | PropertyValue::Texts(_)
                | PropertyValue::Text(_)) => Some(value),
                other => return Err(LoomError::incompatible(tag, &other)),
            },
            scalar => Some(coerce(tag, scalar, value)?),
        };

        let stored = stored.filter(|value| !is_empty_list(value));
        Ok(if self.store(tag, stored) {
            vec![tag.to_string()]
        } else {
            Vec::new()
        })
    }

    fn set_leaf(&mut self, tag: &str, kind: CompositeKind, value: PropertyValue) -> LoomResult<Vec<String>> {
        let aggregate = kind.aggregate();
        let local = kind.local_tag(tag);
        let current = self.values.get(aggregate);
        let updated = composite!(kind, |S| {
            let mut composite = current.and_then(S::from_stored).cloned().unwrap_or_default();
            composite.set_value(&local, value)?;
            Ok::<_, LoomError>((!composite.is_empty()).then(|| composite.into_value()))
        })?;
        Ok(if self.store(aggregate, updated) {
            vec![tag.to_string(), aggregate.to_string()]
        } else {
            Vec::new()
        })
    }

    fn set_bounds(&mut self, tag: &str, value: PropertyValue) -> LoomResult<Vec<String>> {
        let bounds = BoundsProperty::build(tag, value)?;
        let mut changed = Vec::new();
        for side in BOUNDS_SIDES {
            let leaf = format!("{tag}-{side}");
            if self.store(&leaf, bounds.get(side)) {
                changed.push(leaf);
            }
        }
        if !changed.is_empty() {
            changed.push(tag.to_string());
        }
        Ok(changed)
    }

    fn remove_tag(&mut self, tag: &str, kind: PropertyKind) -> Vec<String> {
        match kind {
            PropertyKind::Bounds => {
                let mut changed: Vec<String> = BOUNDS_SIDES
                    .iter()
                    .map(|side| format!("{tag}-{side}"))
                    .filter(|leaf| self.values.remove(leaf).is_some())
                    .collect();
                if !changed.is_empty() {
                    changed.push(tag.to_string());
                }
                changed
            }
            PropertyKind::Composite(composite) => match self.values.remove(tag) {
                Some(stored) => {
                    let mut changed = vec![tag.to_string()];
                    if tag == composite.aggregate() {
                        changed.extend(
                            composite!(composite, |S| S::from_stored(&stored)
                                .map(Properties::all_tags)
                                .unwrap_or_default())
                            .iter()
                            .map(|local| composite.view_tag(local)),
                        );
                    }
                    changed
                }
                None => Vec::new(),
            },
            PropertyKind::Leaf(composite) => {
                let aggregate = composite.aggregate();
                let local = composite.local_tag(tag);
                let Some(current) = self.values.get(aggregate) else {
                    return Vec::new();
                };
                let updated = composite!(composite, |S| S::from_stored(current).map(|c| {
                    let mut c = c.clone();
                    c.remove(&local);
                    (!c.is_empty()).then(|| c.into_value())
                }));
                match updated {
                    Some(updated) => {
                        if self.store(aggregate, updated) {
                            vec![tag.to_string(), aggregate.to_string()]
                        } else {
                            Vec::new()
                        }
                    }
                    None => Vec::new(),
                }
            }
            _ => {
                if self.values.remove(tag).is_some() {
                    vec![tag.to_string()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn get_tag(&self, tag: &str) -> Option<PropertyValue> {
        match view_property_kind(tag) {
            Some(PropertyKind::Bounds) => {
                let mut bounds = BoundsProperty::default();
                for side in BOUNDS_SIDES {
                    if let Some(value) = self.values.get(&format!("{tag}-{side}")) {
                        bounds.set_value(side, value.clone()).ok()?;
                    }
                }
                (!bounds.is_empty()).then(|| bounds.into_value())
            }
            Some(PropertyKind::Leaf(composite)) => {
                let stored = self.values.get(composite.aggregate())?;
                let local = composite.local_tag(tag);
                composite!(composite, |S| S::from_stored(stored).and_then(|c| c.get(&local)))
            }
            _ => self.values.get(tag).cloned(),
        }
    }
}

fn composite_is_empty(kind: CompositeKind, value: &PropertyValue) -> bool {
    composite!(kind, |S| S::from_stored(value).map_or(true, Properties::is_empty))
}

fn is_empty_list(value: &PropertyValue) -> bool {
    match value {
        PropertyValue::Shadows(list) => list.is_empty(),
        PropertyValue::Background(list) => list.is_empty(),
        PropertyValue::Animations(list) => list.is_empty(),
        PropertyValue::Transitions(map) => map.is_empty(),
        PropertyValue::Listeners(list) => list.is_empty(),
        _ => false,
    }
}

/// Build a list property from a ready list, a list of objects or one element
fn build_list<T>(
    tag: &str,
    value: PropertyValue,
    ready: impl FnOnce(PropertyValue) -> Result<Vec<T>, PropertyValue>,
    element: impl Fn(&str, PropertyValue) -> LoomResult<T>,
) -> LoomResult<Vec<T>> {
    let value = match ready(value) {
        Ok(list) => return Ok(list),
        Err(value) => value,
    };
    match value {
        PropertyValue::Objects(objects) => objects
            .into_iter()
            .map(|object| element(tag, PropertyValue::Object(object)))
            .collect(),
        other => Ok(vec![element(tag, other)?]),
    }
}

fn build_transitions(tag: &str, value: PropertyValue) -> LoomResult<BTreeMap<String, Animation>> {
    let params = match value {
        PropertyValue::Transitions(map) => return Ok(map),
        PropertyValue::Params(params) => params,
        PropertyValue::Object(object) => Params::from_object(&object),
        other => return Err(LoomError::incompatible(tag, &other)),
    };
    params
        .into_iter()
        .map(|(property, animation)| {
            Ok((normalize_view_tag(&property), Animation::build(tag, animation)?))
        })
        .collect()
}

impl Properties for PropertyBag {
    fn owner(&self) -> &'static str {
        "view"
    }

    fn normalize(&self, tag: &str) -> String {
        normalize_view_tag(tag)
    }

    fn get(&self, tag: &str) -> Option<PropertyValue> {
        self.get_tag(&normalize_view_tag(tag))
    }

    fn set_value(&mut self, tag: &str, value: PropertyValue) -> LoomResult<()> {
        self.apply(tag, Some(value)).map(|_| ())
    }

    fn remove(&mut self, tag: &str) {
        if let Err(error) = self.apply(tag, None) {
            error.log();
        }
    }

    fn all_tags(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}

impl PartialEq for PropertyBag {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("values", &self.values)
            .field("change_listeners", &self.change_listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{Color, SizeUnit};

    #[test]
    fn test_set_then_remove_restores_bag() {
        let mut bag = PropertyBag::new();
        bag.set("width", "10px");
        let before = bag.clone();

        for (tag, value) in [
            ("height", PropertyValue::from("50%")),
            ("border-top-color", PropertyValue::from("red")),
            ("margin", PropertyValue::from("4px")),
            ("opacity", PropertyValue::from("0.5")),
        ] {
            bag.apply(tag, Some(value)).unwrap();
            bag.apply(tag, None).unwrap();
            assert_eq!(bag, before, "{tag}");
        }
    }

    #[test]
    fn test_set_none_equals_remove() {
        let mut a = PropertyBag::new();
        a.set("padding-left", 3);
        a.set("text-color", "blue");
        let mut b = a.clone();

        a.apply("text-color", None).unwrap();
        b.remove("text-color");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_set_reports_no_change() {
        let mut bag = PropertyBag::new();
        assert_eq!(bag.apply("width", Some("10px".into())).unwrap(), vec!["width"]);
        assert!(bag.apply("width", Some(SizeUnit::px(10.0).into())).unwrap().is_empty());
        assert!(bag.apply("Width ", Some(PropertyValue::Int(10))).unwrap().is_empty());
    }

    #[test]
    fn test_failed_set_leaves_bag_unchanged() {
        let mut bag = PropertyBag::new();
        bag.set("width", "10px");
        let before = bag.clone();
        assert!(!bag.set("width", true));
        assert!(!bag.set("no-such-property", 1));
        assert!(!bag.set("border-left-width", "wide"));
        assert_eq!(bag, before);
    }

    #[test]
    fn test_leaf_delegates_to_composite() {
        let mut bag = PropertyBag::new();
        let changed = bag.apply("border-top-color", Some("red".into())).unwrap();
        assert_eq!(changed, vec!["border-top-color", "border"]);
        assert!(matches!(bag.get_raw("border"), Some(PropertyValue::Border(_))));
        assert_eq!(bag.get("border-top-color"), Some(PropertyValue::Color(Color::RED)));
    }

    #[test]
    fn test_aggregate_then_leaf_reads_back() {
        let mut bag = PropertyBag::new();
        bag.set(
            "border",
            Params::new()
                .with("style", "solid")
                .with("width", "1px")
                .with("color", "#000"),
        );
        assert_eq!(
            bag.get("border-left-width"),
            Some(PropertyValue::Size(SizeUnit::px(1.0)))
        );
        assert_eq!(bag.get("border-top-color"), Some(PropertyValue::Color(Color::BLACK)));
    }

    #[test]
    fn test_remove_aggregate_removes_leaves() {
        let mut bag = PropertyBag::new();
        bag.set("border-left-style", "dashed");
        bag.set("border-top-width", "2px");
        let changed = bag.apply("border", None).unwrap();
        assert_eq!(changed[0], "border");
        assert!(changed.contains(&"border-left-style".to_string()));
        assert!(bag.get("border-left-style").is_none());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_bounds_explode_into_leaves() {
        let mut bag = PropertyBag::new();
        let changed = bag.apply("margin", Some("1px,2px,3px,4px".into())).unwrap();
        assert_eq!(
            changed,
            vec!["margin-top", "margin-right", "margin-bottom", "margin-left", "margin"]
        );
        assert_eq!(
            bag.get("left-margin"),
            Some(PropertyValue::Size(SizeUnit::px(4.0)))
        );
        assert!(matches!(bag.get("margin"), Some(PropertyValue::Bounds(_))));
    }

    #[test]
    fn test_listener_kind_must_match() {
        use crate::events::{EventListener, KeyEvent, MouseEvent};

        let mut bag = PropertyBag::new();
        assert!(bag.set("click-event", EventListener::<MouseEvent>::no_args(|| {})));
        assert!(!bag.set("click-event", EventListener::<KeyEvent>::no_args(|| {})));
        assert_eq!(bag.listeners("click-event").map(ListenerList::len), Some(1));

        let empty: Vec<EventListener<MouseEvent>> = Vec::new();
        assert!(bag.set("click-event", empty));
        assert!(bag.listeners("click-event").is_none());
    }
}
