//! First pass over an export: resolve every binding, publisher and author the
//! file mentions into a stored entity.
//!
//! Rows may reference names that only appear further down the file, so all
//! of them are resolved before any book is written. The resulting
//! [`LookupMaps`] are read-only for the rest of the import.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Read;

use book_manager_catalog::name_parser::{HumanName, parse_human_name};
use book_manager_catalog::types::{Author, Binding, Publisher};
use book_manager_db::operations;
use rusqlite::Connection;

use crate::audit::{AuditEvent, AuditSink, EntityKind, quoted};
use crate::error::ImportError;
use crate::goodreads::ImportStats;
use crate::row::{GoodreadsRow, csv_reader};

/// Stored entities keyed by the strings rows refer to them by.
#[derive(Debug, Default)]
pub struct LookupMaps {
    /// Raw `Binding` column value to binding.
    pub bindings: HashMap<String, Binding>,
    /// Raw `Publisher` column value to publisher.
    pub publishers: HashMap<String, Publisher>,
    /// Canonical full name to author.
    pub authors: HashMap<String, Author>,
}

impl LookupMaps {
    pub fn binding(&self, name: &str) -> Result<&Binding, ImportError> {
        self.bindings
            .get(name)
            .ok_or_else(|| ImportError::missing_lookup("binding", name))
    }

    pub fn publisher(&self, name: &str) -> Result<&Publisher, ImportError> {
        self.publishers
            .get(name)
            .ok_or_else(|| ImportError::missing_lookup("publisher", name))
    }

    pub fn author(&self, full_name: &str) -> Result<&Author, ImportError> {
        self.authors
            .get(full_name)
            .ok_or_else(|| ImportError::missing_lookup("author", full_name))
    }
}

/// Parse a row's author names, in billing order, into canonical full names.
///
/// Names that parse to nothing are dropped. Both passes use this so that the
/// book pass looks up exactly the keys the lookup pass created.
///
/// The components come from parsing the full name itself, so every spelling
/// that renders the same key ("Fontaine, Jean de la" and "Jean de la
/// Fontaine") yields the same first/middle/last.
pub fn author_keys(row: &GoodreadsRow) -> Vec<(String, HumanName)> {
    row.author_names()
        .into_iter()
        .map(|raw| parse_human_name(raw).full_name())
        .filter(|full_name| !full_name.is_empty())
        .map(|full_name| {
            let canonical = parse_human_name(&full_name);
            (full_name, canonical)
        })
        .collect()
}

/// Read every row of an export, then get-or-create each distinct binding,
/// publisher and author inside one transaction.
///
/// Existing authors have their first/middle/last components rewritten from
/// the parse, backfilling records stored without that breakdown.
pub fn load_lookups<R: Read>(
    conn: &Connection,
    reader: R,
    audit: &dyn AuditSink,
    stats: &mut ImportStats,
) -> Result<LookupMaps, ImportError> {
    let mut bindings = BTreeSet::new();
    let mut publishers = BTreeSet::new();
    let mut authors: BTreeMap<String, HumanName> = BTreeMap::new();

    let mut csv = csv_reader(reader);
    for (i, result) in csv.deserialize::<GoodreadsRow>().enumerate() {
        let row = result.map_err(|e| ImportError::at_row(i + 1, e.into()))?;
        stats.rows += 1;

        if !row.binding.is_empty() {
            bindings.insert(row.binding.clone());
        }
        if !row.publisher.is_empty() {
            publishers.insert(row.publisher.clone());
        }
        for (full_name, parsed) in author_keys(&row) {
            authors.entry(full_name).or_insert(parsed);
        }
    }

    let mut maps = LookupMaps::default();
    let tx = conn.unchecked_transaction()?;

    for name in bindings {
        let (binding, created) = operations::get_or_create_binding(&tx, &name)?;
        if created {
            stats.bindings_created += 1;
            audit.record(&AuditEvent::created(
                EntityKind::Binding,
                quoted("name", &name),
            ));
        }
        maps.bindings.insert(name, binding);
    }

    for name in publishers {
        let (publisher, created) = operations::get_or_create_publisher(&tx, &name)?;
        if created {
            stats.publishers_created += 1;
            audit.record(&AuditEvent::created(
                EntityKind::Publisher,
                quoted("name", &name),
            ));
        }
        maps.publishers.insert(name, publisher);
    }

    for (full_name, parsed) in authors {
        let (mut author, created) = operations::get_or_create_author(&tx, &full_name)?;
        if created {
            stats.authors_created += 1;
            audit.record(&AuditEvent::created(
                EntityKind::Author,
                quoted("full_name", &full_name),
            ));
        }
        author.first_name = parsed.first.clone();
        author.middle_name = parsed.middle_opt();
        author.last_name = parsed.last.clone();
        operations::save_author(&tx, &author)?;
        maps.authors.insert(full_name, author);
    }

    tx.commit()?;
    Ok(maps)
}
