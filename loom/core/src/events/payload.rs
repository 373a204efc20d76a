//! Event payloads decoded from browser messages

use crate::data::DataObject;

/// Event time in milliseconds (`timeStamp` with the fraction dropped)
fn time_stamp(data: &DataObject) -> u64 {
    data.property_value("timeStamp")
        .map(|value| value.split('.').next().unwrap_or(value))
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

fn float(data: &DataObject, tag: &str) -> f64 {
    data.float_property(tag).unwrap_or(0.0)
}

fn int(data: &DataObject, tag: &str) -> i64 {
    data.property_value(tag)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}

/// The browser reports modifier flags as `1` / `0`
fn flag(data: &DataObject, tag: &str) -> bool {
    data.property_value(tag) == Some("1")
}

/// Modifier keys held while the event fired
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Control
    pub ctrl: bool,
    /// Shift
    pub shift: bool,
    /// Alt / Option
    pub alt: bool,
    /// Meta / Command
    pub meta: bool,
}

impl Modifiers {
    fn decode(data: &DataObject) -> Self {
        Self {
            ctrl: flag(data, "ctrlKey"),
            shift: flag(data, "shiftKey"),
            alt: flag(data, "altKey"),
            meta: flag(data, "metaKey"),
        }
    }
}

/// Mouse event (`click-event`, `mouse-down`, ...)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MouseEvent {
    /// Event time in milliseconds
    pub time_stamp: u64,
    /// Button that triggered the event: 0 primary, 1 auxiliary, 2 secondary
    pub button: i64,
    /// Bit mask of pressed buttons
    pub buttons: i64,
    /// Position within the view
    pub x: f64,
    /// Position within the view
    pub y: f64,
    /// Position within the page viewport
    pub client_x: f64,
    /// Position within the page viewport
    pub client_y: f64,
    /// Position on the screen
    pub screen_x: f64,
    /// Position on the screen
    pub screen_y: f64,
    /// Held modifiers
    pub modifiers: Modifiers,
}

impl MouseEvent {
    /// Decode from a browser message
    #[must_use]
    pub fn decode(data: &DataObject) -> Self {
        Self {
            time_stamp: time_stamp(data),
            button: int(data, "button"),
            buttons: int(data, "buttons"),
            x: float(data, "x"),
            y: float(data, "y"),
            client_x: float(data, "clientX"),
            client_y: float(data, "clientY"),
            screen_x: float(data, "screenX"),
            screen_y: float(data, "screenY"),
            modifiers: Modifiers::decode(data),
        }
    }
}

/// Pointer event (`pointer-down`, ...)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointerEvent {
    /// Mouse part of the event
    pub mouse: MouseEvent,
    /// Pointer identifier
    pub pointer_id: i64,
    /// Contact width
    pub width: f64,
    /// Contact height
    pub height: f64,
    /// Normalized pressure, 0..1
    pub pressure: f64,
    /// Barrel pressure, -1..1
    pub tangential_pressure: f64,
    /// Tilt in degrees
    pub tilt_x: f64,
    /// Tilt in degrees
    pub tilt_y: f64,
    /// Rotation in degrees
    pub twist: f64,
    /// `mouse`, `pen` or `touch`
    pub pointer_type: String,
    /// Primary pointer of its type
    pub is_primary: bool,
}

impl PointerEvent {
    /// Decode from a browser message
    #[must_use]
    pub fn decode(data: &DataObject) -> Self {
        Self {
            mouse: MouseEvent::decode(data),
            pointer_id: int(data, "pointerId"),
            width: float(data, "width"),
            height: float(data, "height"),
            pressure: float(data, "pressure"),
            tangential_pressure: float(data, "tangentialPressure"),
            tilt_x: float(data, "tiltX"),
            tilt_y: float(data, "tiltY"),
            twist: float(data, "twist"),
            pointer_type: data.property_value("pointerType").unwrap_or_default().to_string(),
            is_primary: flag(data, "isPrimary"),
        }
    }
}

/// One touch point
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Touch {
    /// Stable identifier for the duration of the contact
    pub identifier: i64,
    /// Position within the view
    pub x: f64,
    /// Position within the view
    pub y: f64,
    /// Position within the page viewport
    pub client_x: f64,
    /// Position within the page viewport
    pub client_y: f64,
    /// Position on the screen
    pub screen_x: f64,
    /// Position on the screen
    pub screen_y: f64,
    /// Contact ellipse radius
    pub radius_x: f64,
    /// Contact ellipse radius
    pub radius_y: f64,
    /// Contact ellipse rotation in degrees
    pub rotation_angle: f64,
    /// Pressure, 0..1
    pub force: f64,
}

/// Touch event (`touch-start`, ...)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchEvent {
    /// Event time in milliseconds
    pub time_stamp: u64,
    /// All current contacts
    pub touches: Vec<Touch>,
    /// Held modifiers
    pub modifiers: Modifiers,
}

impl TouchEvent {
    /// Decode from a browser message
    #[must_use]
    pub fn decode(data: &DataObject) -> Self {
        let touches = data
            .property_array("touches")
            .unwrap_or_default()
            .iter()
            .filter_map(|item| item.as_object())
            .map(|touch| Touch {
                identifier: int(touch, "identifier"),
                x: float(touch, "x"),
                y: float(touch, "y"),
                client_x: float(touch, "clientX"),
                client_y: float(touch, "clientY"),
                screen_x: float(touch, "screenX"),
                screen_y: float(touch, "screenY"),
                radius_x: float(touch, "radiusX"),
                radius_y: float(touch, "radiusY"),
                rotation_angle: float(touch, "rotationAngle"),
                force: float(touch, "force"),
            })
            .collect();
        Self {
            time_stamp: time_stamp(data),
            touches,
            modifiers: Modifiers::decode(data),
        }
    }
}

/// Keyboard event (`key-down-event`, `key-up-event`)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyEvent {
    /// Event time in milliseconds
    pub time_stamp: u64,
    /// Printed value of the key
    pub key: String,
    /// Physical key code (`KeyA`, `Enter`, ...)
    pub code: String,
    /// Auto-repeat
    pub repeat: bool,
    /// Held modifiers
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Decode from a browser message
    #[must_use]
    pub fn decode(data: &DataObject) -> Self {
        Self {
            time_stamp: time_stamp(data),
            key: data.property_value("key").unwrap_or_default().to_string(),
            code: data.property_value("code").unwrap_or_default().to_string(),
            repeat: flag(data, "repeat"),
            modifiers: Modifiers::decode(data),
        }
    }

    /// Hot-key lookup string: lowercase code plus `-` and the held modifier
    /// letters (`a`lt, `c`trl, `m`eta, `s`hift), e.g. `keys-cs`
    #[must_use]
    pub fn hot_key(&self) -> String {
        hot_key_name(&self.code, self.modifiers)
    }
}

/// Position of a table cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// Row, counting head rows
    pub row: usize,
    /// Column
    pub column: usize,
}

impl CellIndex {
    /// Decode `row` / `column` from a browser message
    #[must_use]
    pub fn decode(data: &DataObject) -> Option<Self> {
        Some(Self {
            row: data.parse_property("row")?,
            column: data.parse_property("column")?,
        })
    }
}

/// Build the hot-key lookup string for `code` and `modifiers`
#[must_use]
pub fn hot_key_name(code: &str, modifiers: Modifiers) -> String {
    let mut key = code.to_ascii_lowercase();
    let letters: String = [
        (modifiers.alt, 'a'),
        (modifiers.ctrl, 'c'),
        (modifiers.meta, 'm'),
        (modifiers.shift, 's'),
    ]
    .iter()
    .filter(|(held, _)| *held)
    .map(|(_, letter)| *letter)
    .collect();
    if !letters.is_empty() {
        key.push('-');
        key.push_str(&letters);
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_event_decode() {
        let data = DataObject::parse(
            "click-event{id=id000001, timeStamp=1234.56, button=0, buttons=1, x=10.5, y=3, ctrlKey=1, altKey=0}",
        )
        .unwrap();
        let event = MouseEvent::decode(&data);
        assert_eq!(event.time_stamp, 1234);
        assert_eq!(event.button, 0);
        assert_eq!(event.buttons, 1);
        assert_eq!(event.x, 10.5);
        assert!(event.modifiers.ctrl);
        assert!(!event.modifiers.alt);
    }

    #[test]
    fn test_touch_event_decode() {
        let data = DataObject::parse(
            "touch-start{touches=[_{identifier=3, x=1, y=2}, _{identifier=4, force=0.5}]}",
        )
        .unwrap();
        let event = TouchEvent::decode(&data);
        assert_eq!(event.touches.len(), 2);
        assert_eq!(event.touches[0].identifier, 3);
        assert_eq!(event.touches[1].force, 0.5);
    }

    #[test]
    fn test_hot_key_name() {
        let modifiers = Modifiers {
            ctrl: true,
            shift: true,
            ..Modifiers::default()
        };
        assert_eq!(hot_key_name("KeyS", modifiers), "keys-cs");
        assert_eq!(hot_key_name("F5", Modifiers::default()), "f5");
    }
}
