//! Resolution of serialized layer and field references against live layers.
//!
//! Layer IDs are project-local, so a serialized layer is re-identified from
//! its human-assigned name or from the table its data source points at.
//! Strategies are tried in a fixed order and the first hit wins:
//!
//! 1. exact name
//! 2. normalized name (`-` and space folded to `_`, case-insensitive)
//! 3. substring, either direction, case-insensitive
//! 4. `table=` fragment of the data source

use std::fmt;

use thiserror::Error;

use crate::model::LiveLayer;

/// Which strategy matched a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStrategy {
    ExactName,
    NormalizedName,
    Substring,
    SourceTable,
}

impl MatchStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactName => "exact name",
            Self::NormalizedName => "normalized name",
            Self::Substring => "partial name",
            Self::SourceTable => "source table",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live layer together with the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMatch<'a> {
    pub layer: &'a LiveLayer,
    pub strategy: MatchStrategy,
}

/// Find the live layer a serialized reference points at.
#[must_use]
pub fn find_layer<'a>(
    name: Option<&str>,
    source: Option<&str>,
    live_layers: &'a [LiveLayer],
) -> Option<&'a LiveLayer> {
    match_layer(name, source, live_layers).map(|m| m.layer)
}

/// Like [`find_layer`], also reporting the winning strategy.
#[must_use]
pub fn match_layer<'a>(
    name: Option<&str>,
    source: Option<&str>,
    live_layers: &'a [LiveLayer],
) -> Option<LayerMatch<'a>> {
    let found = name
        .filter(|n| !n.is_empty())
        .and_then(|n| match_by_name(n, live_layers))
        .or_else(|| {
            source
                .filter(|s| !s.is_empty())
                .and_then(|s| match_by_source(s, live_layers))
        });

    if let Some(m) = &found {
        tracing::debug!(
            layer_id = %m.layer.id,
            layer_name = %m.layer.name,
            strategy = %m.strategy,
            "Matched layer"
        );
    } else {
        tracing::debug!(?name, ?source, "No layer matched");
    }
    found
}

fn match_by_name<'a>(name: &str, live_layers: &'a [LiveLayer]) -> Option<LayerMatch<'a>> {
    if let Some(layer) = live_layers.iter().find(|l| l.name == name) {
        return Some(LayerMatch {
            layer,
            strategy: MatchStrategy::ExactName,
        });
    }

    let normalized = normalize_name(name);
    if let Some(layer) = live_layers
        .iter()
        .find(|l| normalize_name(&l.name) == normalized)
    {
        return Some(LayerMatch {
            layer,
            strategy: MatchStrategy::NormalizedName,
        });
    }

    let lowered = name.to_lowercase();
    live_layers
        .iter()
        .find(|l| {
            let live = l.name.to_lowercase();
            live.contains(&lowered) || lowered.contains(&live)
        })
        .map(|layer| LayerMatch {
            layer,
            strategy: MatchStrategy::Substring,
        })
}

fn match_by_source<'a>(source: &str, live_layers: &'a [LiveLayer]) -> Option<LayerMatch<'a>> {
    let wanted = table_name(source)?;
    live_layers
        .iter()
        .find(|l| table_name(&l.source) == Some(wanted))
        .map(|layer| LayerMatch {
            layer,
            strategy: MatchStrategy::SourceTable,
        })
}

/// Fold `-` and space to `_` and lowercase.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.replace(['-', ' '], "_").to_lowercase()
}

/// Extract the table name from a `table=` fragment of a data source.
///
/// Takes the text between the first `table=` and the next one, its first
/// whitespace-delimited token, and strips surrounding double quotes, so
/// `table=""` gives an empty name. Table names containing spaces are not
/// supported.
#[must_use]
pub fn table_name(source: &str) -> Option<&str> {
    let (_, rest) = source.split_once("table=")?;
    let segment = rest.split("table=").next().unwrap_or(rest);
    let token = segment.split_whitespace().next()?;
    Some(token.trim_matches('"'))
}

/// Why a field token did not resolve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldResolutionError {
    #[error("invalid field index: {index}")]
    IndexOutOfRange { index: String },

    #[error("field '{name}' not found")]
    UnknownField { name: String },
}

/// Resolve a field token to a field name of a live layer.
#[must_use]
pub fn resolve_field(token: &str, live_fields: &[String]) -> Option<String> {
    lookup_field(token, live_fields).ok()
}

/// Resolve a field token, reporting why it failed.
///
/// A token made only of ASCII digits is a position in `live_fields`;
/// anything else must be present verbatim.
///
/// # Errors
///
/// `IndexOutOfRange` for a position past the end of the field list,
/// `UnknownField` for a name not in it.
pub fn lookup_field(token: &str, live_fields: &[String]) -> Result<String, FieldResolutionError> {
    if is_index_token(token) {
        return token
            .parse::<usize>()
            .ok()
            .and_then(|index| live_fields.get(index))
            .cloned()
            .ok_or_else(|| FieldResolutionError::IndexOutOfRange {
                index: token.to_string(),
            });
    }

    if live_fields.iter().any(|f| f == token) {
        Ok(token.to_string())
    } else {
        Err(FieldResolutionError::UnknownField {
            name: token.to_string(),
        })
    }
}

fn is_index_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layer(id: &str, name: &str, source: &str) -> LiveLayer {
        LiveLayer::new(id, name).with_source(source)
    }

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn exact_name_wins_over_later_strategies() {
        let layers = vec![
            layer("a", "road-network", ""),
            layer("b", "road_network", ""),
        ];
        let m = match_layer(Some("road_network"), None, &layers).unwrap();
        assert_eq!(m.layer.id, "b");
        assert_eq!(m.strategy, MatchStrategy::ExactName);
    }

    #[test]
    fn exact_name_takes_first_duplicate() {
        let layers = vec![layer("a", "parcels", ""), layer("b", "parcels", "")];
        assert_eq!(find_layer(Some("parcels"), None, &layers).unwrap().id, "a");
    }

    #[test]
    fn normalized_name_is_case_insensitive() {
        let layers = vec![layer("p", "Parcels", ""), layer("o", "Owners", "")];
        let m = match_layer(Some("parcels"), None, &layers).unwrap();
        assert_eq!(m.layer.id, "p");
        assert_eq!(m.strategy, MatchStrategy::NormalizedName);
    }

    #[test]
    fn normalized_name_folds_dash_and_space() {
        let layers = vec![layer("r", "Road Network", "")];
        let m = match_layer(Some("road-network"), None, &layers).unwrap();
        assert_eq!(m.strategy, MatchStrategy::NormalizedName);
    }

    #[test]
    fn substring_matches_both_directions() {
        let layers = vec![layer("x", "Parcels 2024", "")];
        let m = match_layer(Some("parcels"), None, &layers).unwrap();
        assert_eq!(m.strategy, MatchStrategy::Substring);

        let layers = vec![layer("y", "owners", "")];
        let m = match_layer(Some("Land owners (old)"), None, &layers).unwrap();
        assert_eq!(m.layer.id, "y");
        assert_eq!(m.strategy, MatchStrategy::Substring);
    }

    #[test]
    fn unnamed_live_layer_is_a_substring_of_any_name() {
        let layers = vec![layer("blank", "", ""), layer("z", "zones", "")];
        let m = match_layer(Some("streets"), None, &layers).unwrap();
        assert_eq!(m.layer.id, "blank");
        assert_eq!(m.strategy, MatchStrategy::Substring);
    }

    #[test]
    fn source_table_used_when_name_fails() {
        let layers = vec![
            layer("a", "Something else", "dbname='gis' table=\"public\".\"roads\" (geom)"),
            layer("b", "Renamed", "dbname='gis' table=\"parcels\" (geom)"),
        ];
        let m = match_layer(
            Some("cadastre"),
            Some("dbname='old' table=\"parcels\" (geom) sql="),
            &layers,
        )
        .unwrap();
        assert_eq!(m.layer.id, "b");
        assert_eq!(m.strategy, MatchStrategy::SourceTable);
    }

    #[test]
    fn source_table_is_case_sensitive() {
        let layers = vec![layer("b", "Renamed", "table=Parcels")];
        assert!(find_layer(None, Some("table=parcels"), &layers).is_none());
    }

    #[test]
    fn source_table_skips_layers_without_fragment() {
        let layers = vec![
            layer("file", "Shapefile", "/data/parcels.shp"),
            layer("broken", "Broken", "table=   "),
            layer("db", "Db", "table=parcels"),
        ];
        assert_eq!(find_layer(None, Some("table=parcels"), &layers).unwrap().id, "db");
    }

    #[test]
    fn empty_name_goes_straight_to_source() {
        let layers = vec![layer("a", "anything", "table=t1")];
        let m = match_layer(Some(""), Some("table=t1"), &layers).unwrap();
        assert_eq!(m.strategy, MatchStrategy::SourceTable);
    }

    #[test]
    fn nothing_matches() {
        let layers = vec![layer("a", "roads", "table=roads")];
        assert!(find_layer(Some("rivers"), Some("table=rivers"), &layers).is_none());
        assert!(find_layer(None, None, &layers).is_none());
        assert!(find_layer(Some("rivers"), None, &[]).is_none());
    }

    #[test]
    fn table_name_extraction() {
        assert_eq!(table_name("table=\"public\".\"parcels\" (geom)"), Some("public\".\"parcels"));
        assert_eq!(table_name("dbname=x table=\"roads\""), Some("roads"));
        assert_eq!(table_name("table=  roads key=id"), Some("roads"));
        assert_eq!(table_name("table=a table=b"), Some("a"));
        assert_eq!(table_name("table=atable=b"), Some("a"));
        assert_eq!(table_name("table="), None);
        assert_eq!(table_name("table=\"\""), Some(""));
        assert_eq!(table_name("/data/roads.shp"), None);
    }

    #[test]
    fn quoted_empty_tables_match_each_other() {
        let layers = vec![layer("e", "Empty", "table=\"\" key=id")];
        assert_eq!(find_layer(None, Some("table=\"\" (geom)"), &layers).unwrap().id, "e");
    }

    #[test]
    fn normalize_name_folds() {
        assert_eq!(normalize_name("Road Net-Work"), "road_net_work");
    }

    #[test]
    fn index_token_resolves_position() {
        let live = fields(&["fid", "name"]);
        assert_eq!(resolve_field("0", &live).as_deref(), Some("fid"));
        assert_eq!(
            lookup_field("2", &live),
            Err(FieldResolutionError::IndexOutOfRange {
                index: "2".to_string()
            })
        );
    }

    #[test]
    fn huge_index_is_out_of_range() {
        let live = fields(&["fid"]);
        assert!(matches!(
            lookup_field("99999999999999999999999999", &live),
            Err(FieldResolutionError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn name_token_must_match_verbatim() {
        let live = fields(&["fid", "Name"]);
        assert_eq!(resolve_field("Name", &live).as_deref(), Some("Name"));
        assert_eq!(
            lookup_field("name", &live),
            Err(FieldResolutionError::UnknownField {
                name: "name".to_string()
            })
        );
        assert!(resolve_field("-1", &live).is_none());
        assert!(resolve_field("", &live).is_none());
    }

    #[test]
    fn digit_named_field_is_read_as_index() {
        let live = fields(&["a", "b", "7"]);
        assert!(resolve_field("7", &live).is_none());
        assert_eq!(resolve_field("2", &live).as_deref(), Some("7"));
    }

    proptest! {
        #[test]
        fn index_tokens_resolve_by_position(
            names in proptest::collection::vec("[a-z]{1,8}", 0..12),
            index in 0usize..32,
        ) {
            let resolved = resolve_field(&index.to_string(), &names);
            if index < names.len() {
                prop_assert_eq!(resolved, Some(names[index].clone()));
            } else {
                prop_assert_eq!(resolved, None);
            }
        }
    }
}
