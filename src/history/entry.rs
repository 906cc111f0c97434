// ClipGuardian - Structure ClipboardEntry
// Represente une entree dans l'historique du presse-papiers
//
// Ce module definit les types de donnees fondamentaux de l'historique :
// - `EntryFormat` : etiquette de format (texte, RTF, HTML, image, ...)
// - `Fingerprint` : empreinte SHA-256 du couple (format, contenu)
// - `EntryId` : identifiant stable d'une entree, attribue par le store
// - `EntryFlags` : drapeaux (epingle) serialises sur 1 octet
// - `ClipboardEntry` : entree complete avec horodatages et contenu
//
// # Deduplication
// Deux entrees de meme empreinte sont la meme entree logique. L'empreinte
// couvre l'etiquette de format : un meme texte copie en brut puis en RTF
// donne deux entrees distinctes.
//
// # Horodatage
// Les horodatages sont en millisecondes UTC depuis l'epoch Unix.

use crate::constants::FINGERPRINT_SIZE;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::fmt;

/// Etiquette de format du contenu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EntryFormat {
    /// Texte brut UTF-8
    Text = 0,
    /// Texte riche (RTF)
    RichText = 1,
    /// Fragment HTML
    Html = 2,
    /// Image (largeur, hauteur, pixels RGBA)
    Image = 3,
    /// Chemins de fichiers, un par ligne
    Files = 4,
    /// URLs, une par ligne
    Urls = 5,
    /// Tableau (CSV)
    Table = 6,
}

impl EntryFormat {
    /// Convertit un octet en EntryFormat.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Text),
            1 => Some(Self::RichText),
            2 => Some(Self::Html),
            3 => Some(Self::Image),
            4 => Some(Self::Files),
            5 => Some(Self::Urls),
            6 => Some(Self::Table),
            _ => None,
        }
    }

    /// Vrai si le contenu est lisible comme du texte (participe a la recherche).
    pub fn is_textual(self) -> bool {
        !matches!(self, Self::Image)
    }

    /// Nom court du format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::RichText => "rich",
            Self::Html => "html",
            Self::Image => "image",
            Self::Files => "files",
            Self::Urls => "urls",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for EntryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Empreinte SHA-256 d'un contenu et de son format.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_SIZE]);

impl Fingerprint {
    /// Calcule l'empreinte de `content` pour le format donne.
    pub fn compute(format: EntryFormat, content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([format as u8]);
        hasher.update(content);
        Self(hasher.finalize().into())
    }

    /// Octets bruts de l'empreinte.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_SIZE] {
        &self.0
    }

    /// Prefixe hexadecimal court, utilisable dans les logs.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Identifiant stable d'une entree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Flags d'une entree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryFlags {
    /// L'entree est epinglee (protegee de l'eviction)
    pub pinned: bool,
}

impl EntryFlags {
    /// Serialise les flags en un octet.
    pub fn to_byte(self) -> u8 {
        if self.pinned { 1 } else { 0 }
    }

    /// Deserialise les flags depuis un octet.
    pub fn from_byte(b: u8) -> Self {
        Self { pinned: (b & 1) != 0 }
    }
}

/// Une entree dans l'historique du presse-papiers.
///
/// L'empreinte est toujours derivee du contenu : les champs ne sont
/// modifiables que par le store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub(crate) id: EntryId,
    pub(crate) format: EntryFormat,
    pub(crate) content: Vec<u8>,
    pub(crate) fingerprint: Fingerprint,
    pub(crate) captured_at: i64,
    pub(crate) last_seen_at: i64,
    pub(crate) seq: u64,
    pub(crate) flags: EntryFlags,
}

impl ClipboardEntry {
    /// Cree une entree observee pour la premiere fois a `now`.
    pub(crate) fn new(id: EntryId, seq: u64, format: EntryFormat, content: Vec<u8>, now: i64) -> Self {
        let fingerprint = Fingerprint::compute(format, &content);
        Self {
            id,
            format,
            content,
            fingerprint,
            captured_at: now,
            last_seen_at: now,
            seq,
            flags: EntryFlags::default(),
        }
    }

    /// Reconstruit une entree persistee (l'empreinte est recalculee).
    pub(crate) fn restore(
        id: EntryId,
        seq: u64,
        format: EntryFormat,
        content: Vec<u8>,
        captured_at: i64,
        last_seen_at: i64,
        flags: EntryFlags,
    ) -> Self {
        let fingerprint = Fingerprint::compute(format, &content);
        Self { id, format, content, fingerprint, captured_at, last_seen_at, seq, flags }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn format(&self) -> EntryFormat {
        self.format
    }

    /// Contenu brut.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Premiere observation (ms UTC).
    pub fn captured_at(&self) -> i64 {
        self.captured_at
    }

    /// Derniere observation (ms UTC), rafraichie a chaque nouvelle copie.
    pub fn last_seen_at(&self) -> i64 {
        self.last_seen_at
    }

    /// Numero de sequence de la derniere mise en tete.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_pinned(&self) -> bool {
        self.flags.pinned
    }

    /// Vue texte du contenu (UTF-8 avec remplacement).
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Retourne un apercu tronque du contenu.
    pub fn preview(&self, max_len: usize) -> String {
        if !self.format.is_textual() {
            return format!("[{}] {} bytes", self.format, self.content.len());
        }
        let text = self.text();
        let first_line = text.lines().next().unwrap_or("");
        if first_line.chars().count() <= max_len {
            first_line.to_string()
        } else if max_len < 3 {
            // Pas la place pour les points de suspension
            first_line.chars().take(max_len).collect()
        } else {
            let mut s: String = first_line.chars().take(max_len.saturating_sub(3)).collect();
            s.push_str("...");
            s
        }
    }

    /// Taille du contenu en octets.
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Horloge murale en millisecondes UTC.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
