//! NumberPicker: `<input type="number">` or a range slider

use crate::bridge::ScriptArg;
use crate::error::{LoomError, LoomResult};
use crate::events::NUMBER_CHANGED_EVENT;
use crate::properties::enums;
use crate::properties::names;
use crate::properties::resolve::{enum_value, float_value, int_value};
use crate::properties::PropertyValue;
use crate::session::Session;
use crate::values::format_float;
use crate::view::ViewId;

/// Presentation of a number picker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberPickerType {
    /// Text field with spin buttons
    #[default]
    Editor,
    /// Range slider, `0..1` unless bounded
    Slider,
}

impl NumberPickerType {
    fn input_type(self) -> &'static str {
        match self {
            Self::Editor => "number",
            Self::Slider => "range",
        }
    }
}

impl Session {
    fn style_float(&self, id: &ViewId, tag: &str) -> Option<f64> {
        self.style_value(id, tag).and_then(|v| float_value(&v, &self.resolver()))
    }

    /// Editor or slider
    #[must_use]
    pub fn get_number_picker_type(&self, id: &ViewId) -> NumberPickerType {
        match self
            .style_value(id, names::NUMBER_PICKER_TYPE)
            .and_then(|v| enum_value(&v, &enums::NUMBER_PICKER_TYPE, &self.resolver()))
        {
            Some(1) => NumberPickerType::Slider,
            _ => NumberPickerType::Editor,
        }
    }

    /// Bounds, ordered; an editor is unbounded unless told otherwise
    #[must_use]
    pub fn get_number_picker_min_max(&self, id: &ViewId) -> (f64, f64) {
        let (default_min, default_max) = match self.get_number_picker_type(id) {
            NumberPickerType::Slider => (0.0, 1.0),
            NumberPickerType::Editor => (f64::NEG_INFINITY, f64::INFINITY),
        };
        let min = self.style_float(id, names::NUMBER_PICKER_MIN).unwrap_or(default_min);
        let max = self.style_float(id, names::NUMBER_PICKER_MAX).unwrap_or(default_max);
        if min > max {
            (max, min)
        } else {
            (min, max)
        }
    }

    /// Increment, `None` for any value
    #[must_use]
    pub fn get_number_picker_step(&self, id: &ViewId) -> Option<f64> {
        let (_, max) = self.get_number_picker_min_max(id);
        self.style_float(id, names::NUMBER_PICKER_STEP)
            .filter(|step| *step > 0.0)
            .map(|step| step.min(max))
    }

    /// Current value; the lower bound (or zero) when unset
    #[must_use]
    pub fn get_number_picker_value(&self, id: &ViewId) -> f64 {
        let (min, max) = self.get_number_picker_min_max(id);
        self.style_float(id, names::NUMBER_PICKER_VALUE).unwrap_or_else(|| {
            if min.is_finite() {
                min
            } else {
                0.0_f64.min(max)
            }
        })
    }

    /// Decimals shown, `0` for the shortest form
    #[must_use]
    pub fn get_number_picker_precision(&self, id: &ViewId) -> usize {
        self.style_value(id, names::NUMBER_PICKER_PRECISION)
            .and_then(|v| int_value(&v, &self.resolver()))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0)
    }

    fn number_text(&self, id: &ViewId, value: f64) -> String {
        match self.get_number_picker_precision(id) {
            0 => format_float(value),
            precision => format!("{value:.precision$}"),
        }
    }

    /// `min`, `max` and `step` attribute values
    fn number_picker_bounds(&self, id: &ViewId) -> [(&'static str, Option<String>); 3] {
        let (min, max) = self.get_number_picker_min_max(id);
        let step = self
            .get_number_picker_step(id)
            .map_or_else(|| "any".to_string(), |step| self.number_text(id, step));
        [
            ("min", min.is_finite().then(|| self.number_text(id, min))),
            ("max", max.is_finite().then(|| self.number_text(id, max))),
            ("step", Some(step)),
        ]
    }

    pub(crate) fn write_number_picker_attributes(&self, id: &ViewId, out: &mut String) {
        use crate::view::write_attr;

        write_attr(out, "type", self.get_number_picker_type(id).input_type());
        for (name, value) in self.number_picker_bounds(id) {
            if let Some(value) = value {
                write_attr(out, name, &value);
            }
        }
        write_attr(out, "value", &self.number_text(id, self.get_number_picker_value(id)));
        self.write_data_list_attribute(id, out);
        out.push_str(" oninput=\"editViewInputEvent(this)\"");
    }

    /// Patch `type`, `min`, `max`, `step` and the shown value
    pub(crate) fn emit_number_picker_bounds(&mut self, id: &ViewId) {
        let input_type = self.get_number_picker_type(id).input_type();
        let bounds = self.number_picker_bounds(id);
        let value = self.number_text(id, self.get_number_picker_value(id));
        self.emit(|bridge| {
            bridge.update_property(id.as_str(), "type", ScriptArg::from(input_type));
            for (name, value) in bounds {
                match value {
                    Some(value) => bridge.update_property(id.as_str(), name, ScriptArg::from(value)),
                    None => bridge.remove_property(id.as_str(), name),
                }
            }
            bridge.call_func("setInputValue", &[ScriptArg::from(id.as_str()), ScriptArg::from(value)]);
        });
    }

    /// Push the shown value after a change from code
    pub(crate) fn emit_number_picker_value(&mut self, id: &ViewId) {
        let value = self.number_text(id, self.get_number_picker_value(id));
        self.emit(|bridge| {
            bridge.call_func("setInputValue", &[ScriptArg::from(id.as_str()), ScriptArg::from(value)]);
        });
    }

    /// Set the value from code; fires `number-changed` with `(new, old)`
    ///
    /// # Errors
    ///
    /// A value that is not a number or lies outside the bounds.
    pub(crate) fn set_number_picker_value(&mut self, id: &ViewId, value: Option<PropertyValue>) -> LoomResult<()> {
        let old = self.get_number_picker_value(id);
        if let Some(v) = &value {
            let n = float_value(v, &self.resolver())
                .ok_or_else(|| LoomError::incompatible(names::NUMBER_PICKER_VALUE, v))?;
            let (min, max) = self.get_number_picker_min_max(id);
            if n < min || n > max {
                return Err(LoomError::incompatible(names::NUMBER_PICKER_VALUE, &n));
            }
        }
        let view = self
            .views
            .get_mut(id)
            .ok_or_else(|| LoomError::NotFound { path: id.to_string() })?;
        let changed = view.bag.apply(names::NUMBER_PICKER_VALUE, value)?;
        self.property_changed(id, &changed);

        let new = self.get_number_picker_value(id);
        if new != old {
            self.fire(id, NUMBER_CHANGED_EVENT, &(new, old));
        }
        Ok(())
    }

    /// The user edited the number; the input already shows it
    pub(crate) fn number_picker_text_changed(&mut self, id: &ViewId, text: &str) {
        let Ok(value) = text.trim().parse::<f64>() else {
            tracing::debug!(view = %id, text = %text, "number picker text is not a number");
            return;
        };
        let old = self.get_number_picker_value(id);
        self.without_updates(|session| {
            let changed = match session.views.get_mut(id) {
                Some(view) => view.bag.apply(names::NUMBER_PICKER_VALUE, Some(PropertyValue::Float(value))),
                None => return,
            };
            match changed {
                Ok(changed) => session.property_changed(id, &changed),
                Err(e) => e.log(),
            }
        });
        if value != old {
            self.fire(id, NUMBER_CHANGED_EVENT, &(value, old));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::DataObject;
    use crate::events::EventListener;
    use crate::session::test_support::{connected_session, drain};
    use crate::view::ViewKind;

    fn changes(session: &mut Session, picker: &ViewId) -> Arc<Mutex<Vec<(f64, f64)>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        session.set(
            picker,
            NUMBER_CHANGED_EVENT,
            EventListener::<(f64, f64)>::event_only(move |change| sink.lock().push(*change)),
        );
        seen
    }

    #[test]
    fn test_editor_and_slider_defaults() {
        let (mut session, _rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        assert_eq!(session.get_number_picker_type(&picker), NumberPickerType::Editor);
        assert_eq!(session.get_number_picker_min_max(&picker), (f64::NEG_INFINITY, f64::INFINITY));
        assert_eq!(session.get_number_picker_value(&picker), 0.0);

        session.set(&picker, "type", "slider");
        assert_eq!(session.get_number_picker_min_max(&picker), (0.0, 1.0));
        session.set(&picker, "min", 10);
        session.set(&picker, "max", 2);
        assert_eq!(session.get_number_picker_min_max(&picker), (2.0, 10.0));
        assert_eq!(session.get_number_picker_value(&picker), 2.0);
    }

    #[test]
    fn test_renders_input() {
        let (mut session, mut rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        session.set(&picker, "type", "slider");
        session.set(&picker, "max", 100);
        session.set(&picker, "value", 25);
        session.set_root_view(&picker);
        let out = drain(&mut rx);
        assert!(out.contains("<input id=\"id000001\" class=\"ruiNumberPicker ruiView\""), "{out}");
        assert!(
            out.contains(" type=\"range\" min=\"0\" max=\"100\" step=\"any\" value=\"25\" oninput=\"editViewInputEvent(this)\">"),
            "{out}"
        );
        assert!(!out.contains("</input>"), "{out}");
    }

    #[test]
    fn test_value_from_code() {
        let (mut session, mut rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        session.set(&picker, names::NUMBER_PICKER_PRECISION, 2);
        session.set(&picker, names::NUMBER_PICKER_MAX, 10);
        let seen = changes(&mut session, &picker);
        session.set_root_view(&picker);
        drain(&mut rx);

        assert!(session.set(&picker, "value", 1.5));
        assert!(drain(&mut rx).contains("setInputValue('id000001', '1.50');"));
        assert!(!session.set(&picker, "value", 11));
        assert!(!session.set(&picker, "value", "many"));
        assert_eq!(session.get_number_picker_value(&picker), 1.5);
        assert_eq!(*seen.lock(), vec![(1.5, 0.0)]);
    }

    #[test]
    fn test_text_changed_message() {
        let (mut session, mut rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        let seen = changes(&mut session, &picker);
        session.set_root_view(&picker);
        drain(&mut rx);

        session.handle_message(&DataObject::parse("textChanged{session=1, id=id000001, text=\"4.25\"}").unwrap());
        assert_eq!(session.get_number_picker_value(&picker), 4.25);
        assert_eq!(drain(&mut rx), "");
        session.handle_message(&DataObject::parse("textChanged{session=1, id=id000001, text=\"\"}").unwrap());
        assert_eq!(session.get_number_picker_value(&picker), 4.25);
        assert_eq!(*seen.lock(), vec![(4.25, 0.0)]);
    }

    #[test]
    fn test_bounds_are_patched() {
        let (mut session, mut rx) = connected_session();
        let picker = session.create_view(ViewKind::NumberPicker);
        session.set_root_view(&picker);
        drain(&mut rx);

        session.set(&picker, "type", "slider");
        let out = drain(&mut rx);
        assert!(out.contains("element.setAttribute('type', 'range');"), "{out}");
        assert!(out.contains("element.setAttribute('min', '0');"), "{out}");
        assert!(out.contains("element.setAttribute('max', '1');"), "{out}");
        assert!(out.contains("element.setAttribute('step', 'any');"), "{out}");
    }
}
