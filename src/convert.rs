//! Response body conversion.
//!
//! A raw response body is decoded into the expected type by an ordered chain
//! of converters. Each converter either claims the body and decodes it,
//! declines so the next converter gets a chance, or fails the whole
//! conversion outright. The first claim wins; when every converter declines,
//! conversion fails with [`ConvertError::NoConverter`].
//!
//! The order matters: the empty-body rule and the legacy JSON sniff both
//! depend on sequential fallthrough, so the chain must not be collapsed into
//! a lookup table keyed by content type.

use crate::error::{snippet, ConvertError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Marker type meaning "no response body expected".
///
/// Using `NoContent` as the expected response type makes conversion succeed
/// with this sentinel no matter what the server sent back, body or not.
///
/// # Examples
///
/// ```
/// use http::Method;
/// use restcall::{NoContent, Request};
///
/// let fire_and_forget = Request::<NoContent>::builder(Method::DELETE)
///     .path("/sessions/current")
///     .build();
/// # let _ = fire_and_forget;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct NoContent;

/// One step of the chain: `Ok(Some(value))` claims the body, `Ok(None)`
/// declines and lets the next converter try, `Err` aborts conversion.
type Converter<T> = fn(&str, Option<&str>) -> Result<Option<T>, ConvertError>;

/// Runs the converter chain over a response body.
///
/// `content_type` is the raw value of the response's `Content-Type` header,
/// if present.
///
/// # Errors
///
/// Fails when a converter claims the body but cannot decode it, when the
/// body is empty but `T` requires one, or when no converter claims the body
/// at all.
pub fn convert<T>(body: &str, content_type: Option<&str>) -> Result<T, ConvertError>
where
    T: DeserializeOwned + 'static,
{
    let chain: [Converter<T>; 4] = [empty_body, json, string, xml];
    for converter in chain {
        if let Some(value) = converter(body, content_type)? {
            return Ok(value);
        }
    }
    Err(ConvertError::NoConverter {
        body: snippet(body),
        content_type: content_type.map(ToOwned::to_owned),
        target: std::any::type_name::<T>(),
    })
}

/// Produces the [`NoContent`] sentinel when no body is expected, and rejects
/// empty bodies for every other target type.
///
/// Rejection is a hard failure, not a decline: an empty body cannot satisfy
/// any later converter.
fn empty_body<T: 'static>(body: &str, _content_type: Option<&str>) -> Result<Option<T>, ConvertError> {
    if TypeId::of::<T>() == TypeId::of::<NoContent>() {
        if let Ok(sentinel) = (Box::new(NoContent) as Box<dyn Any>).downcast::<T>() {
            return Ok(Some(*sentinel));
        }
    }
    if body.is_empty() {
        return Err(ConvertError::BodyMissing {
            target: std::any::type_name::<T>(),
        });
    }
    Ok(None)
}

/// Decodes JSON bodies.
///
/// Claims the body when the content type contains `application/json`, or
/// through the legacy sniff for upstreams that send JSON under `text/plain`
/// or no content type at all.
fn json<T: DeserializeOwned>(
    body: &str,
    content_type: Option<&str>,
) -> Result<Option<T>, ConvertError> {
    let content_type_json = content_type.is_some_and(|t| t.contains("application/json"));
    if content_type_json || is_legacy_json(body, content_type) {
        return serde_json::from_str(body)
            .map(Some)
            .map_err(|source| ConvertError::Json {
                body: snippet(body),
                source,
            });
    }
    Ok(None)
}

// TODO: drop the sniffing fallback once the remaining upstreams send
// application/json for JSON bodies.
fn is_legacy_json(body: &str, content_type: Option<&str>) -> bool {
    let untyped = content_type.map_or(true, |t| t.is_empty() || t.contains("text/plain"));
    let legacy = untyped && (body.starts_with('{') || body.starts_with('['));
    if legacy {
        tracing::error!(
            content_type = ?content_type,
            body = %snippet(body),
            "legacy JSON body without a JSON content type, check the upstream producer"
        );
    }
    legacy
}

/// Hands the body over verbatim when the caller asked for a plain `String`.
/// No content-type check.
fn string<T: 'static>(body: &str, _content_type: Option<&str>) -> Result<Option<T>, ConvertError> {
    if TypeId::of::<T>() == TypeId::of::<String>() {
        if let Ok(text) = (Box::new(body.to_owned()) as Box<dyn Any>).downcast::<T>() {
            return Ok(Some(*text));
        }
    }
    Ok(None)
}

/// Decodes XML bodies when the content type contains `text/xml`.
///
/// `application/xml` deliberately does not match; upstreams served through
/// this client declare `text/xml`.
fn xml<T>(body: &str, content_type: Option<&str>) -> Result<Option<T>, ConvertError>
where
    T: DeserializeOwned + 'static,
{
    if !content_type.is_some_and(|t| t.contains("text/xml")) {
        return Ok(None);
    }
    let decode = xml_decoder_for::<T>();
    let value = decode(body).map_err(|source| ConvertError::Xml {
        body: snippet(body),
        source,
    })?;
    if let Ok(value) = value.downcast::<T>() {
        return Ok(Some(*value));
    }
    Ok(None)
}

/// A cached XML decode entry point for one target type.
type XmlDecoder = fn(&str) -> Result<Box<dyn Any>, quick_xml::DeError>;

/// Per-type decoder cache. Entries are built lazily on first use and never
/// evicted; the map is bounded by the number of distinct target types.
static XML_DECODERS: OnceLock<RwLock<HashMap<TypeId, XmlDecoder>>> = OnceLock::new();

fn decode_xml<T: DeserializeOwned + 'static>(
    body: &str,
) -> Result<Box<dyn Any>, quick_xml::DeError> {
    quick_xml::de::from_str::<T>(body).map(|value| Box::new(value) as Box<dyn Any>)
}

/// Looks up or creates the decoder for `T`.
///
/// Lookup-or-create is idempotent: a racing writer stores the same entry
/// point, so losing the race is harmless.
fn xml_decoder_for<T: DeserializeOwned + 'static>() -> XmlDecoder {
    let decoders = XML_DECODERS.get_or_init(|| RwLock::new(HashMap::new()));
    let key = TypeId::of::<T>();
    {
        let decoders = decoders.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(decoder) = decoders.get(&key) {
            return *decoder;
        }
    }
    let mut decoders = decoders.write().unwrap_or_else(PoisonError::into_inner);
    *decoders.entry(key).or_insert(decode_xml::<T> as XmlDecoder)
}
