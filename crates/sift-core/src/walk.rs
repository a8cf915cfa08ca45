use crate::{
    config::SearchConfig,
    entity::{EntityDef, scope_key},
    error::CompileError,
    params::ParamBag,
    predicate::{BuildInput, Predicate, build},
    sort::{SortKey, resolve_sort},
    time::{TimeRange, resolve_time},
    value::Value,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sift_schema::DriverSchema;
use std::collections::BTreeSet;

///
/// SearchOptions
///
/// Per-call switches mirroring the classic filter knobs: suppress the broad
/// q search, OR-join explicit filters, or coerce exact matches into fuzzy
/// ones.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchOptions {
    pub ignore_q: bool,
    pub force_or: bool,
    pub force_like: bool,
}

///
/// CompiledQuery
///
/// The compiler's complete output: a predicate tree, ordered sort keys, and
/// an optional time window, all backend-agnostic.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub predicate: Predicate,
    pub sort: Vec<SortKey>,
    pub time: Option<TimeRange>,
}

// Per-invocation traversal state: the visited set grows monotonically for
// the lifetime of one top-level compile call and is discarded with it.
struct WalkContext {
    visited: BTreeSet<&'static str>,
}

impl WalkContext {
    const fn new() -> Self {
        Self {
            visited: BTreeSet::new(),
        }
    }
}

///
/// Compiler
///
/// Stateless orchestration over one driver's schema: normalizes parameters
/// per scope, builds each entity's own predicate, and recursively extends
/// the predicate across the declared relation graph. Safe to share across
/// threads; every compile call owns its private visited set.
///

pub struct Compiler<'a> {
    schema: &'a DriverSchema,
    config: &'a SearchConfig,
}

impl<'a> Compiler<'a> {
    #[must_use]
    pub const fn new(schema: &'a DriverSchema, config: &'a SearchConfig) -> Self {
        Self { schema, config }
    }

    /// Compile a request against an entity, stamping time windows against
    /// the current instant.
    pub fn compile(
        &self,
        entity: &'static EntityDef,
        request: &ParamBag,
        options: SearchOptions,
    ) -> Result<CompiledQuery, CompileError> {
        self.compile_at(entity, request, options, Utc::now())
    }

    /// Compile with an explicit "now"; the compiler itself performs no
    /// clock reads, so resolution is fully deterministic.
    pub fn compile_at(
        &self,
        entity: &'static EntityDef,
        request: &ParamBag,
        options: SearchOptions,
        now: DateTime<Utc>,
    ) -> Result<CompiledQuery, CompileError> {
        let mut ctx = WalkContext::new();
        let predicate = self.walk(entity, request, options, &mut ctx, 0)?;

        // Sort and time resolution happen once, at the top level only.
        let table = self.schema.try_table(entity.table)?;
        let sort = resolve_sort(request, table, entity.nulls_first);
        let time = resolve_time(request, entity.time_column, entity.time_zone, now)?;

        Ok(CompiledQuery {
            predicate,
            sort,
            time,
        })
    }

    ///
    /// Column names of the entity's table with its excluded keys removed:
    /// the set request keys are matched against.
    ///
    pub fn prepared_table_keys(
        &self,
        entity: &'static EntityDef,
    ) -> Result<Vec<String>, CompileError> {
        let table = self.schema.try_table(entity.table)?;

        Ok(table
            .columns()
            .iter()
            .filter(|col| !entity.excluded_keys.iter().any(|key| *key == col.name))
            .map(|col| col.name.clone())
            .collect())
    }

    ///
    /// Build a semi-join predicate for one relation from explicit keys and
    /// a shared value, without request parsing. The classic "all these
    /// related columns match this value" helper.
    ///
    pub fn relation_filter(
        &self,
        entity: &'static EntityDef,
        relation: &str,
        keys: &[&str],
        value: &Value,
        force_or: bool,
    ) -> Result<Predicate, CompileError> {
        let rel = entity
            .relation(relation)
            .filter(|_| entity.allowed_relations.iter().any(|name| *name == relation))
            .ok_or_else(|| CompileError::UnknownRelation {
                entity: entity.name,
                relation: relation.to_string(),
            })?;
        let target = (rel.target)();
        let table = self.schema.try_table(target.table)?;

        let mut params = ParamBag::new();
        for key in keys {
            params.insert((*key).to_string(), value.clone())?;
        }
        let params = params.normalize(target.excluded_keys, None, false, &self.config.q_alias);
        let accept_q = params.filled(&self.config.q_alias);

        let predicate = build(&BuildInput {
            table,
            excluded_keys: target.excluded_keys,
            like_keys: target.like_keys,
            params: &params,
            accept_q,
            force_or,
            force_like: false,
            q_alias: &self.config.q_alias,
        });

        Ok(Predicate::has(relation, predicate))
    }

    // One recursion step: compile this entity's own predicate from its
    // normalized scope, then walk its declared relations.
    fn walk(
        &self,
        entity: &'static EntityDef,
        scope: &ParamBag,
        options: SearchOptions,
        ctx: &mut WalkContext,
        depth: usize,
    ) -> Result<Predicate, CompileError> {
        if depth > self.config.max_depth {
            return Err(CompileError::MaxDepthExceeded {
                entity: entity.name,
                max_depth: self.config.max_depth,
            });
        }

        tracing::debug!(entity = entity.name, depth, "compiling entity scope");

        let q_alias = self.config.q_alias.as_str();
        let table = self.schema.try_table(entity.table)?;
        ctx.visited.insert(entity.name);

        let own = scope.normalize(entity.excluded_keys, None, options.ignore_q, q_alias);
        let accept_q = !options.ignore_q && own.filled(q_alias);

        let mut predicate = if own.is_empty() {
            Predicate::True
        } else {
            build(&BuildInput {
                table,
                excluded_keys: entity.excluded_keys,
                like_keys: entity.like_keys,
                params: &own,
                accept_q,
                force_or: options.force_or,
                force_like: options.force_like,
                q_alias,
            })
        };

        for relation in entity.allowed_relations {
            let rel = entity
                .relation(relation)
                .ok_or_else(|| CompileError::UnknownRelation {
                    entity: entity.name,
                    relation: (*relation).to_string(),
                })?;
            let target = (rel.target)();

            // q propagates into a relation only when the entity lists it.
            let allow_q = !options.ignore_q && entity.is_q_relation(relation);
            let scoped = scope.normalize(&[], Some(&scope_key(relation)), !allow_q, q_alias);

            if scoped.is_empty() {
                continue;
            }

            // A bare propagating q must not bounce back into an entity this
            // pass has already expanded; reciprocal relations would
            // otherwise re-trigger each other forever.
            if scoped.is_lone(q_alias) && ctx.visited.contains(target.name) {
                tracing::debug!(
                    entity = entity.name,
                    relation,
                    "skipping q-only recursion into visited entity"
                );
                continue;
            }

            if !self.should_be_searched(target, &scoped, !allow_q, ctx, depth + 1)? {
                continue;
            }

            let sub_options = SearchOptions {
                ignore_q: !allow_q,
                ..options
            };
            let sub = self.walk(target, &scoped, sub_options, ctx, depth + 1)?;

            // A propagating broad search widens the result set; explicit
            // relation filters narrow it.
            let or_joined = scoped.filled(q_alias);
            predicate = predicate.attach(Predicate::has(*relation, sub), or_joined);
        }

        Ok(predicate)
    }

    // Is there anything for the target entity in this scoped bag? True when
    // the bag touches the target's own columns, when a lone broad-search
    // term still has an unvisited entity to land on, or when any deeper
    // relation scope answers yes.
    fn should_be_searched(
        &self,
        target: &'static EntityDef,
        scoped: &ParamBag,
        ignore_q: bool,
        ctx: &WalkContext,
        depth: usize,
    ) -> Result<bool, CompileError> {
        if depth > self.config.max_depth {
            return Err(CompileError::MaxDepthExceeded {
                entity: target.name,
                max_depth: self.config.max_depth,
            });
        }

        let q_alias = self.config.q_alias.as_str();
        let table = self.schema.try_table(target.table)?;

        let owns_key = scoped.keys().any(|key| {
            key != q_alias
                && !target.excluded_keys.iter().any(|excluded| *excluded == key)
                && table.has_column(key)
        });
        if owns_key {
            return Ok(true);
        }

        if scoped.is_lone(q_alias) && !ctx.visited.contains(target.name) {
            return Ok(true);
        }

        for relation in target.allowed_relations {
            let rel = target
                .relation(relation)
                .ok_or_else(|| CompileError::UnknownRelation {
                    entity: target.name,
                    relation: (*relation).to_string(),
                })?;
            let deeper = scoped.normalize(&[], Some(&scope_key(relation)), ignore_q, q_alias);

            if !deeper.is_empty()
                && self.should_be_searched((rel.target)(), &deeper, ignore_q, ctx, depth + 1)?
            {
                return Ok(true);
            }
        }

        Ok(false)
    }
}
