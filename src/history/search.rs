// ClipGuardian - Recherche dans l'historique
// Filtrage par sous-chaine, insensible a la casse
//
// Ce module fournit la recherche dans l'historique pour le navigateur
// d'historique de l'UI.
//
// # Algorithme
// Recherche naive par `contains` sur chaque entree textuelle, dans
// l'ordre du store (plus recente en premier). La comparaison se fait
// en minuscules. Si la requete est vide, toutes les entrees textuelles
// sont retournees. Les images ne participent pas a la recherche.
//
// # Paresse
// `Search` est un iterateur paresseux : aucune entree n'est examinee
// avant d'etre demandee. Il ne conserve aucun etat entre deux appels a
// `HistoryStore::search` ; un clone repart de la position courante.

use crate::history::entry::ClipboardEntry;

/// Iterateur paresseux sur les entrees correspondant a une requete.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    entries: std::slice::Iter<'a, ClipboardEntry>,
    query: String,
}

impl<'a> Search<'a> {
    pub(crate) fn new(entries: &'a [ClipboardEntry], query: &str) -> Self {
        Self {
            entries: entries.iter(),
            query: query.to_lowercase(),
        }
    }
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a ClipboardEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let query = &self.query;
        self.entries.by_ref().find(|e| matches(e, query))
    }
}

/// Vrai si l'entree est textuelle et contient la requete (deja en minuscules).
fn matches(entry: &ClipboardEntry, query_lower: &str) -> bool {
    if !entry.format().is_textual() {
        return false;
    }
    query_lower.is_empty() || entry.text().to_lowercase().contains(query_lower)
}

#[cfg(test)]
mod tests {
    use crate::history::entry::EntryFormat;
    use crate::history::store::HistoryStore;

    fn store_with(items: &[(EntryFormat, &str)]) -> HistoryStore {
        let mut store = HistoryStore::new(16).unwrap();
        for (i, (format, content)) in items.iter().enumerate() {
            store.insert_at(*format, content.as_bytes().to_vec(), i as i64);
        }
        store
    }

    fn texts(results: Vec<&crate::history::entry::ClipboardEntry>) -> Vec<String> {
        results.into_iter().map(|e| e.text().into_owned()).collect()
    }

    #[test]
    fn test_search_case_insensitive_most_recent_first() {
        let store = store_with(&[
            (EntryFormat::Text, "hello world"),
            (EntryFormat::Text, "goodbye"),
            (EntryFormat::Text, "Hello there"),
        ]);
        let found = texts(store.search("hello").collect());
        assert_eq!(found, vec!["Hello there", "hello world"]);
    }

    #[test]
    fn test_search_no_match() {
        let store = store_with(&[(EntryFormat::Text, "hello")]);
        assert_eq!(store.search("xyz").count(), 0);
    }

    #[test]
    fn test_search_empty_query_lists_textual_entries() {
        let store = store_with(&[
            (EntryFormat::Text, "a"),
            (EntryFormat::Image, "pixels"),
            (EntryFormat::Html, "<b>b</b>"),
        ]);
        assert_eq!(texts(store.search("").collect()), vec!["<b>b</b>", "a"]);
    }

    #[test]
    fn test_search_skips_images() {
        let store = store_with(&[(EntryFormat::Image, "hello")]);
        assert_eq!(store.search("hello").count(), 0);
    }

    #[test]
    fn test_search_is_lazy_and_restartable() {
        let store = store_with(&[
            (EntryFormat::Text, "match one"),
            (EntryFormat::Text, "other"),
            (EntryFormat::Text, "match two"),
        ]);
        let mut first = store.search("match");
        assert_eq!(first.next().unwrap().text(), "match two");
        // Un nouvel appel repart du debut
        assert_eq!(store.search("match").count(), 2);
        assert_eq!(first.next().unwrap().text(), "match one");
        assert!(first.next().is_none());
    }
}
