// ClipGuardian - Serialisation/deserialisation binaire
// Format proprietaire compact pour les entrees de l'historique
//
// Ce module serialise les ClipboardEntry en format binaire compact,
// qui constitue le clair chiffre dans le fichier d'historique.
//
// # Format d'une entree
// ```text
// [id]           u64 LE (8 octets)
// [seq]          u64 LE (8 octets)
// [captured_at]  i64 LE (8 octets, ms UTC)
// [last_seen_at] i64 LE (8 octets, ms UTC)
// [format]       u8 (1 octet)
// [flags]        u8 (1 octet)
// [content_len]  u32 LE (4 octets)
// [content]      content_len octets (opaques)
// ```
//
// # Format d'un vecteur d'entrees
// ```text
// [count]        u32 LE (4 octets)
// Pour chaque entree :
//   [entry_size]  u32 LE (4 octets)
//   [entry_data]  entry_size octets
// ```
//
// # Robustesse
// Chaque champ est valide avant lecture (taille restante verifiee).
// L'empreinte n'est pas stockee : elle est recalculee a la lecture.

use crate::error::{CgError, CgResult};
use crate::history::entry::{ClipboardEntry, EntryFlags, EntryFormat, EntryId};

/// Taille fixe d'une entree hors contenu.
const ENTRY_HEADER_SIZE: usize = 8 + 8 + 8 + 8 + 1 + 1 + 4;

/// Curseur de lecture borne.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn bytes(&mut self, n: usize, what: &str) -> CgResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| CgError::Corruption(format!("Data too short for {}", what)))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> CgResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> CgResult<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u32(&mut self, what: &str) -> CgResult<u32> {
        Ok(u32::from_le_bytes(self.array(what)?))
    }

    fn u64(&mut self, what: &str) -> CgResult<u64> {
        Ok(u64::from_le_bytes(self.array(what)?))
    }

    fn i64(&mut self, what: &str) -> CgResult<i64> {
        Ok(i64::from_le_bytes(self.array(what)?))
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

/// Serialise une entree en format binaire.
pub fn serialize_entry(entry: &ClipboardEntry) -> Vec<u8> {
    let content = entry.content();
    let mut buf = Vec::with_capacity(ENTRY_HEADER_SIZE + content.len());
    buf.extend_from_slice(&entry.id().0.to_le_bytes());
    buf.extend_from_slice(&entry.seq().to_le_bytes());
    buf.extend_from_slice(&entry.captured_at().to_le_bytes());
    buf.extend_from_slice(&entry.last_seen_at().to_le_bytes());
    buf.push(entry.format() as u8);
    buf.push(entry.flags.to_byte());
    buf.extend_from_slice(&(content.len() as u32).to_le_bytes());
    buf.extend_from_slice(content);
    buf
}

/// Deserialise une entree. Retourne l'entree et le nombre d'octets consommes.
pub fn deserialize_entry(data: &[u8]) -> CgResult<(ClipboardEntry, usize)> {
    let mut r = Reader::new(data);
    let id = EntryId(r.u64("id")?);
    let seq = r.u64("seq")?;
    let captured_at = r.i64("captured_at")?;
    let last_seen_at = r.i64("last_seen_at")?;
    let raw_format = r.u8("format")?;
    let format = EntryFormat::from_u8(raw_format)
        .ok_or_else(|| CgError::Corruption(format!("Invalid entry format: {}", raw_format)))?;
    let flags = EntryFlags::from_byte(r.u8("flags")?);
    let content_len = r.u32("content_len")? as usize;
    let content = r.bytes(content_len, "content")?.to_vec();

    let entry = ClipboardEntry::restore(id, seq, format, content, captured_at, last_seen_at, flags);
    Ok((entry, r.pos))
}

/// Serialise un vecteur d'entrees.
pub fn serialize_entries(entries: &[ClipboardEntry]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        let data = serialize_entry(entry);
        // Prefixer chaque entree par sa taille pour faciliter le parsing
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&data);
    }
    buf
}

/// Deserialise un vecteur d'entrees.
pub fn deserialize_entries(data: &[u8]) -> CgResult<Vec<ClipboardEntry>> {
    let mut r = Reader::new(data);
    let count = r.u32("entry count")? as usize;
    let mut entries = Vec::with_capacity(count.min(10_000));

    for _ in 0..count {
        let entry_size = r.u32("entry size")? as usize;
        let body = r.bytes(entry_size, "entry body")?;
        let (entry, consumed) = deserialize_entry(body)?;
        if consumed != entry_size {
            return Err(CgError::Corruption("Entry size mismatch".into()));
        }
        entries.push(entry);
    }

    if r.remaining() != 0 {
        return Err(CgError::Corruption("Trailing bytes after entries".into()));
    }
    Ok(entries)
}
