// ClipGuardian - Presse-papiers du systeme
// Lecture/ecriture via la crate arboard (Windows, macOS, X11/Wayland)
//
// Une seule instance `arboard::Clipboard` est gardee pour toute la vie du
// backend : sous X11/Wayland c'est elle qui sert la selection apres une
// ecriture. Elle est ouverte au premier acces et recreee seulement apres
// une erreur non transitoire.
//
// # Formats (ordre de lecture)
// - HTML : `get().html()` / `set_html` (texte alternatif = HTML)
// - Fichiers : `get().file_list()`, un chemin par ligne ; ecrits comme texte
// - Texte : `get_text`, classe en RTF, URLs, tableau (tabulations) ou texte
// - Image : charge utile `[largeur u32 LE][hauteur u32 LE][pixels RGBA]`
//
// # Erreurs
// - `ClipboardOccupied` -> `CgError::TransientIo` (reessai au cycle suivant)
// - `ContentNotAvailable` -> format absent, on essaie le suivant
// - autres -> `CgError::Clipboard`

use crate::clipboard::{ClipboardBackend, ClipboardSnapshot};
use crate::error::{CgError, CgResult};
use crate::history::EntryFormat;
use arboard::{Clipboard, ImageData};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// Presse-papiers du systeme.
pub struct SystemClipboard {
    inner: Option<Clipboard>,
}

impl fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemClipboard").field("open", &self.inner.is_some()).finish()
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClipboard {
    /// Backend non encore ouvert ; l'ouverture a lieu au premier acces.
    pub fn new() -> Self {
        Self { inner: None }
    }

    fn clipboard(&mut self) -> CgResult<&mut Clipboard> {
        if self.inner.is_none() {
            self.inner = Some(Clipboard::new().map_err(map_error)?);
            debug!("system clipboard opened");
        }
        self.inner
            .as_mut()
            .ok_or_else(|| CgError::Clipboard("clipboard unavailable".into()))
    }

    /// Convertit une erreur arboard ; l'instance est abandonnee si l'erreur
    /// n'est pas transitoire.
    fn fail(&mut self, e: arboard::Error) -> CgError {
        let err = map_error(e);
        if !err.is_transient() {
            self.inner = None;
        }
        err
    }

    fn read_formats(&mut self) -> CgResult<Option<ClipboardSnapshot>> {
        let clipboard = self.clipboard()?;

        let html = clipboard.get().html();
        match html {
            Ok(html) if !html.trim().is_empty() => {
                return Ok(Some(ClipboardSnapshot::new(EntryFormat::Html, html.into_bytes())))
            }
            Ok(_) | Err(arboard::Error::ContentNotAvailable) | Err(arboard::Error::ClipboardNotSupported) => {}
            Err(e) => return Err(self.fail(e)),
        }

        let clipboard = self.clipboard()?;
        let files = clipboard.get().file_list();
        match files {
            Ok(paths) if !paths.is_empty() => {
                let lines: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                return Ok(Some(ClipboardSnapshot::new(EntryFormat::Files, lines.join("\n").into_bytes())));
            }
            Ok(_) | Err(arboard::Error::ContentNotAvailable) | Err(arboard::Error::ClipboardNotSupported) => {}
            Err(e) => return Err(self.fail(e)),
        }

        let clipboard = self.clipboard()?;
        let text = clipboard.get_text();
        match text {
            Ok(text) => {
                let format = classify_text(&text);
                return Ok(Some(ClipboardSnapshot::new(format, text.into_bytes())));
            }
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(self.fail(e)),
        }

        let clipboard = self.clipboard()?;
        let image = clipboard.get_image();
        match image {
            Ok(img) => Ok(Some(ClipboardSnapshot::new(EntryFormat::Image, encode_image(&img)))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(self.fail(e)),
        }
    }
}

impl ClipboardBackend for SystemClipboard {
    fn read(&mut self) -> CgResult<Option<ClipboardSnapshot>> {
        self.read_formats()
    }

    fn write(&mut self, format: EntryFormat, content: &[u8]) -> CgResult<()> {
        let result = match format {
            EntryFormat::Image => {
                let img = decode_image(content)?;
                self.clipboard()?.set_image(img)
            }
            EntryFormat::Html => {
                let html = String::from_utf8_lossy(content).into_owned();
                self.clipboard()?.set_html(html.clone(), Some(html))
            }
            _ => {
                let text = String::from_utf8_lossy(content).into_owned();
                self.clipboard()?.set_text(text)
            }
        };
        result.map_err(|e| self.fail(e))
    }

    fn read_back_forms(&self, format: EntryFormat, content: &[u8]) -> Vec<ClipboardSnapshot> {
        let mut forms = vec![ClipboardSnapshot::new(format, content.to_vec())];
        if format != EntryFormat::Image {
            // Tout format non image est ecrit comme texte (ou avec un texte alternatif)
            let text = String::from_utf8_lossy(content);
            for alt in [EntryFormat::Text, classify_text(&text)] {
                if forms.iter().all(|f| f.format != alt) {
                    forms.push(ClipboardSnapshot::new(alt, content.to_vec()));
                }
            }
        }
        forms
    }
}

/// Classe un texte brut : RTF, liste d'URLs, tableau ou texte.
pub fn classify_text(text: &str) -> EntryFormat {
    let trimmed = text.trim_start();
    if trimmed.starts_with("{\\rtf") {
        return EntryFormat::RichText;
    }
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        return EntryFormat::Text;
    }
    if lines.iter().all(|l| is_url(l)) {
        return EntryFormat::Urls;
    }
    if lines.len() >= 2 && text.lines().filter(|l| !l.trim().is_empty()).all(|l| l.contains('\t')) {
        return EntryFormat::Table;
    }
    EntryFormat::Text
}

fn is_url(line: &str) -> bool {
    const SCHEMES: [&str; 4] = ["http://", "https://", "ftp://", "file://"];
    !line.contains(char::is_whitespace)
        && SCHEMES
            .iter()
            .any(|scheme| line.len() > scheme.len() && line[..scheme.len()].eq_ignore_ascii_case(scheme))
}

fn map_error(e: arboard::Error) -> CgError {
    match e {
        arboard::Error::ClipboardOccupied => CgError::TransientIo("clipboard occupied".into()),
        other => CgError::Clipboard(other.to_string()),
    }
}

/// Encode une image arboard en charge utile d'entree.
pub fn encode_image(img: &ImageData<'_>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(8 + img.bytes.len());
    buf.extend_from_slice(&(img.width as u32).to_le_bytes());
    buf.extend_from_slice(&(img.height as u32).to_le_bytes());
    buf.extend_from_slice(&img.bytes);
    buf
}

/// Decode une charge utile d'entree en image arboard.
pub fn decode_image(data: &[u8]) -> CgResult<ImageData<'static>> {
    if data.len() < 8 {
        return Err(CgError::Clipboard("Image payload too short".into()));
    }
    let width = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let height = u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
    let pixels = &data[8..];
    let expected = width.checked_mul(height).and_then(|n| n.checked_mul(4));
    if expected != Some(pixels.len()) {
        return Err(CgError::Clipboard(format!(
            "Image payload size mismatch for {}x{}",
            width, height
        )));
    }
    Ok(ImageData { width, height, bytes: Cow::Owned(pixels.to_vec()) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_payload_roundtrip() {
        let img = ImageData { width: 2, height: 1, bytes: Cow::Owned(vec![1, 2, 3, 4, 5, 6, 7, 8]) };
        let payload = encode_image(&img);
        assert_eq!(payload.len(), 16);
        let decoded = decode_image(&payload).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.bytes.as_ref(), img.bytes.as_ref());
    }

    #[test]
    fn test_image_payload_mismatch() {
        assert!(decode_image(&[0; 4]).is_err());
        let mut payload = encode_image(&ImageData { width: 1, height: 1, bytes: Cow::Owned(vec![0; 4]) });
        payload.pop();
        assert!(decode_image(&payload).is_err());
    }

    #[test]
    fn test_classify_text() {
        assert_eq!(classify_text("hello"), EntryFormat::Text);
        assert_eq!(classify_text("{\\rtf1\\ansi hi}"), EntryFormat::RichText);
        assert_eq!(classify_text("https://a.example\nHTTP://b.example/x\n"), EntryFormat::Urls);
        assert_eq!(classify_text("see https://a.example"), EntryFormat::Text);
        assert_eq!(classify_text("a\tb\nc\td"), EntryFormat::Table);
        assert_eq!(classify_text("a\tb"), EntryFormat::Text);
    }

    #[test]
    fn test_read_back_forms_cover_text_fallback() {
        let cb = SystemClipboard::new();
        let forms = cb.read_back_forms(EntryFormat::Html, b"<i>x</i>");
        assert_eq!(forms[0], ClipboardSnapshot::new(EntryFormat::Html, b"<i>x</i>".to_vec()));
        assert!(forms.contains(&ClipboardSnapshot::new(EntryFormat::Text, b"<i>x</i>".to_vec())));

        let forms = cb.read_back_forms(EntryFormat::Files, b"/tmp/a\n/tmp/b");
        assert!(forms.iter().any(|f| f.format == EntryFormat::Text));

        let forms = cb.read_back_forms(EntryFormat::Text, b"https://a.example");
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[1].format, EntryFormat::Urls);

        let forms = cb.read_back_forms(EntryFormat::Image, &[0; 8]);
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn test_backend_opens_lazily() {
        let cb = SystemClipboard::new();
        assert!(cb.inner.is_none());
    }

    #[test]
    fn test_occupied_is_transient() {
        assert!(map_error(arboard::Error::ClipboardOccupied).is_transient());
        assert!(!map_error(arboard::Error::ClipboardNotSupported).is_transient());
    }
}
