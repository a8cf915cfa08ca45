use convert_case::{Case, Casing};

///
/// RelationDef
///
/// One declared, statically known relation: the request-facing name and an
/// accessor to the target entity definition. The accessor is a function
/// pointer so mutually referential entity graphs can be expressed as
/// ordinary statics.
///

#[derive(Clone, Copy, Debug)]
pub struct RelationDef {
    pub name: &'static str,
    pub target: fn() -> &'static EntityDef,
}

impl RelationDef {
    #[must_use]
    pub const fn new(name: &'static str, target: fn() -> &'static EntityDef) -> Self {
        Self { name, target }
    }
}

///
/// EntityDef
///
/// Per-entity search configuration plus the declared relation registry.
/// `allowed_relations` is the ordered list the walker traverses; every name
/// in it must resolve through `relations`. `q_relations` lists the
/// relations a broad q search may propagate into.
///

#[derive(Clone, Copy, Debug)]
pub struct EntityDef {
    /// Entity-type identifier, used by the visited set.
    pub name: &'static str,
    pub table: &'static str,
    pub excluded_keys: &'static [&'static str],
    pub like_keys: &'static [&'static str],
    pub allowed_relations: &'static [&'static str],
    pub relations: &'static [RelationDef],
    pub q_relations: &'static [&'static str],
    pub time_column: &'static str,
    pub time_zone: &'static str,
    pub nulls_first: bool,
}

impl EntityDef {
    /// Baseline definition; statics refine it with struct-update syntax.
    #[must_use]
    pub const fn new(name: &'static str, table: &'static str) -> Self {
        Self {
            name,
            table,
            excluded_keys: &[],
            like_keys: &[],
            allowed_relations: &[],
            relations: &[],
            q_relations: &[],
            time_column: "created_at",
            time_zone: "UTC",
            nulls_first: false,
        }
    }

    /// Resolve a declared relation by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.iter().find(|rel| rel.name == name)
    }

    #[must_use]
    pub fn is_q_relation(&self, name: &str) -> bool {
        self.q_relations.iter().any(|rel| *rel == name)
    }
}

///
/// Derive the parameter-namespace prefix for a relation: the singularized,
/// snake-cased relation name. `"blogPosts"` scopes under `"blog_post_*"`.
///
#[must_use]
pub fn scope_key(relation: &str) -> String {
    singularize(relation).to_case(Case::Snake)
}

// Suffix-rule singularization; enough for conventional relation names.
fn singularize(word: &str) -> String {
    if word.len() > 3 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }

    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if word.len() > suffix.len() && word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }

    if word.ends_with("ss") {
        return word.to_string();
    }

    word.strip_suffix('s').unwrap_or(word).to_string()
}
