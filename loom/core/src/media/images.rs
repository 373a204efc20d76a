//! Asynchronous image loading
//!
//! `load_image` asks the browser to fetch an image and remembers who wants
//! to know. The browser answers with `imageLoaded{url, width, height}` or
//! `imageError{url, message}`; every waiting listener then runs once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::bridge::ScriptArg;
use crate::data::DataObject;
use crate::session::Session;

/// Loading state of an image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    /// Requested, no answer yet
    Loading,
    /// Loaded; the size is known
    Ready,
    /// The browser could not load it
    Error,
}

/// An image known to the session
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Url as requested (constants resolved)
    pub url: String,
    /// Loading state
    pub status: ImageStatus,
    /// Natural width in pixels
    pub width: f64,
    /// Natural height in pixels
    pub height: f64,
    /// Browser message of a failed load
    pub error: Option<String>,
}

impl Image {
    fn loading(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: ImageStatus::Loading,
            width: 0.0,
            height: 0.0,
            error: None,
        }
    }
}

/// Called once with the load result
pub type ImageListener = Arc<dyn Fn(&mut Session, &Image) + Send + Sync>;

struct Entry {
    image: Image,
    listeners: Vec<ImageListener>,
}

/// Image registry of a session
#[derive(Default)]
pub struct ImageManager {
    images: HashMap<String, Entry>,
}

impl fmt::Debug for ImageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageManager").field("images", &self.images.len()).finish()
    }
}

impl ImageManager {
    /// Urls of the images the browser has loaded
    pub(crate) fn ready_urls(&self) -> Vec<String> {
        self.images
            .iter()
            .filter(|(_, entry)| entry.image.status == ImageStatus::Ready)
            .map(|(url, _)| url.clone())
            .collect()
    }
}

impl Session {
    /// Start loading `url`; `on_loaded` runs once when the browser answers
    ///
    /// `@name` urls are resolved through the theme's image table. An image
    /// that is already loaded is returned as is and `on_loaded` is not called;
    /// a second request for an image still loading only adds the listener.
    pub fn load_image(&mut self, url: &str, on_loaded: Option<ImageListener>) -> Image {
        let url = match url.strip_prefix('@') {
            Some(name) => match self.theme().image(name, self.dark_theme()) {
                Some(resolved) => resolved.to_string(),
                None => {
                    tracing::warn!(session = self.id(), image = %name, "image constant missing");
                    url.to_string()
                }
            },
            None => url.to_string(),
        };

        if let Some(entry) = self.images.images.get_mut(&url) {
            match entry.image.status {
                ImageStatus::Ready => return entry.image.clone(),
                ImageStatus::Loading => {
                    entry.listeners.extend(on_loaded);
                    return entry.image.clone();
                }
                ImageStatus::Error => {}
            }
        }

        let image = Image::loading(&url);
        self.images.images.insert(
            url.clone(),
            Entry {
                image: image.clone(),
                listeners: on_loaded.into_iter().collect(),
            },
        );
        self.command("loadImage", |bridge| {
            bridge.call_func("loadImage", &[ScriptArg::from(url.as_str())]);
        });
        image
    }

    /// Image as last known
    #[must_use]
    pub fn image(&self, url: &str) -> Option<&Image> {
        self.images.images.get(url).map(|entry| &entry.image)
    }

    pub(crate) fn image_loaded(&mut self, data: &DataObject) {
        let Some(url) = data.property_value("url") else {
            tracing::error!(session = self.id(), "imageLoaded without url");
            return;
        };
        let Some(entry) = self.images.images.get_mut(url) else {
            tracing::debug!(session = self.id(), url = %url, "load result of an image nobody asked for");
            return;
        };
        entry.image.status = ImageStatus::Ready;
        entry.image.width = data.float_property("width").unwrap_or(0.0);
        entry.image.height = data.float_property("height").unwrap_or(0.0);
        let image = entry.image.clone();
        let listeners = std::mem::take(&mut entry.listeners);
        for listener in listeners {
            listener(self, &image);
        }
    }

    pub(crate) fn image_load_error(&mut self, data: &DataObject) {
        let Some(url) = data.property_value("url") else {
            tracing::error!(session = self.id(), "imageError without url");
            return;
        };
        if !self.images.images.contains_key(url) {
            return;
        }
        let message = data.property_value("message").unwrap_or_default().to_string();
        tracing::warn!(session = self.id(), url = %url, message = %message, "image failed to load");
        let Some(entry) = self.images.images.get_mut(url) else {
            return;
        };
        entry.image.status = ImageStatus::Error;
        entry.image.error = Some(message);
        let image = entry.image.clone();
        let listeners = std::mem::take(&mut entry.listeners);
        for listener in listeners {
            listener(self, &image);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::session::test_support::{connected_session, drain};

    fn listener(count: &Arc<AtomicUsize>) -> Option<ImageListener> {
        let count = Arc::clone(count);
        Some(Arc::new(move |_: &mut Session, image: &Image| {
            assert_eq!(image.status, ImageStatus::Ready);
            count.fetch_add(1, Ordering::SeqCst);
        }))
    }

    #[test]
    fn test_load_then_loaded() {
        let (mut session, mut rx) = connected_session();
        let calls = Arc::new(AtomicUsize::new(0));
        let image = session.load_image("cat.png", listener(&calls));
        assert_eq!(image.status, ImageStatus::Loading);
        session.load_image("cat.png", listener(&calls));
        assert_eq!(drain(&mut rx), "loadImage('cat.png');");

        session.handle_message(&DataObject::parse("imageLoaded{url=\"cat.png\", width=40, height=30}").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let image = session.image("cat.png").unwrap();
        assert!((image.width - 40.0).abs() < f64::EPSILON);

        session.handle_message(&DataObject::parse("imageLoaded{url=\"cat.png\", width=40, height=30}").unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(session.load_image("cat.png", None).status, ImageStatus::Ready);
        assert_eq!(drain(&mut rx), "");
    }

    #[test]
    fn test_error_allows_retry() {
        let (mut session, mut rx) = connected_session();
        let failed = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&failed);
        session.load_image(
            "missing.png",
            Some(Arc::new(move |_: &mut Session, image: &Image| {
                assert_eq!(image.error.as_deref(), Some("404"));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
        );
        session.handle_message(&DataObject::parse("imageError{url=\"missing.png\", message=\"404\"}").unwrap());
        assert_eq!(failed.load(Ordering::SeqCst), 1);
        assert_eq!(session.image("missing.png").unwrap().status, ImageStatus::Error);

        drain(&mut rx);
        session.load_image("missing.png", None);
        assert_eq!(drain(&mut rx), "loadImage('missing.png');");
    }
}
