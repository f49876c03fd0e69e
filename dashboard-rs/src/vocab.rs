/**
 * vocab.rs
 * Fixed PGHD ontology namespaces shared by the importer and the query layer.
 *
 * These IRIs are the schema contract between imported documents and the
 * metric queries; changing one side without the other silently empties
 * every result set.
 */

/// PGHD connect vocabulary (patient linkage, collection events).
pub const PGHDC: &str = "https://github.com/RenVit318/pghd/tree/main/src/vocab/pghd_connect/";

/// Auxiliary collection metadata (location / person / position).
pub const BP_AUX: &str = "https://github.com/RenVit318/pghd/tree/main/src/vocab/auxillary_info/";

/// SMASH biomarker ontology (blood pressure measurement values).
pub const SMASH: &str = "http://aimlab.cs.uoregon.edu/smash/ontologies/biomarker.owl#";

/// Fitbit measurement vocabulary.
pub const FITBIT: &str = "https://github.com/RenVit318/pghd/tree/main/src/vocab/fitbit/";

pub const DC: &str = "http://purl.org/dc/elements/1.1/";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// PREFIX header prepended to every generated SPARQL query.
pub fn prefix_block() -> String {
    format!(
        "PREFIX pghdc: <{PGHDC}>\n\
         PREFIX bp_aux: <{BP_AUX}>\n\
         PREFIX smash: <{SMASH}>\n\
         PREFIX fitbit: <{FITBIT}>\n\
         PREFIX dc: <{DC}>\n\
         PREFIX rdfs: <{RDFS}>\n\
         PREFIX xsd: <{XSD}>\n"
    )
}

/// Expand a `prefix:local` CURIE against the fixed namespace table.
/// Absolute IRIs pass through unchanged. Unknown prefixes return `None`.
pub fn expand_curie(curie: &str) -> Option<String> {
    if curie.contains("://") {
        return Some(curie.to_string());
    }
    let (prefix, local) = curie.split_once(':')?;
    let ns = match prefix {
        "pghdc" => PGHDC,
        "bp_aux" => BP_AUX,
        "smash" => SMASH,
        "fitbit" => FITBIT,
        "dc" => DC,
        "rdf" => RDF,
        "rdfs" => RDFS,
        "xsd" => XSD,
        _ => return None,
    };
    Some(format!("{ns}{local}"))
}
