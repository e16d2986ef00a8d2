//! Pass 3: the Definition Builder (`SPEC_FULL.md` §4.4).
//!
//! `DefinitionBuilder` is mutable scratch state for this pass only; once
//! [`DefinitionBuilder::into_index`] runs, every definition it produced is
//! immutable (§3.4: "Definitions are immutable after pass 3 completes").
//! `HandlerTable` is the precomputed `(category, entity, subtag)` dispatch
//! table called for in §9's "Enum-keyed handler dispatch" design note - each
//! language module builds one via [`HandlerTableBuilder`] and populates it
//! with its own handler functions.

use crate::capture::Capture;
use crate::context::ProcessingContext;
use codesearch_core::capture::Category;
use codesearch_core::definitions::{
    ClassDefinition, EnumDefinition, EnumMember, ExportInfo, FunctionDefinition, ImportDefinition,
    ImportKind, InterfaceDefinition, InterfaceMethod, MethodDefinition, NamespaceDefinition,
    PropertyDefinition, TypeAliasDefinition, VariableDefinition, VariableKindTag,
};
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::{Location, ScopeId, SymbolId, SymbolName};
use codesearch_core::{IndexerConfig, Language, SemanticIndex};
use std::collections::HashMap;
use tree_sitter::Node;

/// A pass-3 handler: inspects the AST node behind `capture`, gathers
/// whatever attributes its language's grammar exposes, and calls the
/// matching `DefinitionBuilder` mutation method. `source` is the full file
/// text (a capture's own `text`/`node` cover only its own span).
pub type HandlerFn = fn(&Capture, &ProcessingContext, &mut DefinitionBuilder, &str, &IndexerConfig) -> Result<()>;

fn table_key(name: &codesearch_core::capture::CaptureName) -> (Category, String, Option<String>) {
    (name.category, name.entity.clone(), name.subtags.first().cloned())
}

/// The precomputed `(category, entity, subtag)` → handler table (§4.4.1, §9).
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<(Category, String, Option<String>), HandlerFn>,
}

impl HandlerTable {
    pub fn builder() -> HandlerTableBuilder {
        HandlerTableBuilder::default()
    }

    pub fn get(&self, name: &codesearch_core::capture::CaptureName) -> Option<HandlerFn> {
        self.handlers
            .get(&table_key(name))
            .or_else(|| self.handlers.get(&(name.category, name.entity.clone(), None)))
            .copied()
    }
}

#[derive(Default)]
pub struct HandlerTableBuilder {
    handlers: HashMap<(Category, String, Option<String>), HandlerFn>,
}

impl HandlerTableBuilder {
    /// Registers a handler for every capture of `category.entity`, ignoring subtags.
    pub fn on(mut self, category: Category, entity: &str, handler: HandlerFn) -> Self {
        self.handlers.insert((category, entity.to_string(), None), handler);
        self
    }

    /// Registers a handler for `category.entity.subtag` specifically, taking
    /// priority over a same-entity handler with no subtag.
    pub fn on_subtag(mut self, category: Category, entity: &str, subtag: &str, handler: HandlerFn) -> Self {
        self.handlers
            .insert((category, entity.to_string(), Some(subtag.to_string())), handler);
        self
    }

    /// Folds in every entry of `other`, letting `self`'s entries win on conflict.
    /// Used by TypeScript to extend JavaScript's registry (§4.4.1).
    pub fn extend(mut self, other: HandlerTable) -> Self {
        for (k, v) in other.handlers {
            self.handlers.entry(k).or_insert(v);
        }
        self
    }

    pub fn build(self) -> HandlerTable {
        HandlerTable { handlers: self.handlers }
    }
}

/// Runs pass 3 in its two sub-passes: every non-decorator capture first,
/// then every decorator capture (§4.4, second paragraph).
pub fn run(
    ctx: &ProcessingContext,
    handler_table: &HandlerTable,
    builder: &mut DefinitionBuilder,
    source: &str,
    config: &IndexerConfig,
) -> Result<()> {
    for capture in ctx.captures.iter().filter(|c| c.category() != Category::Decorator) {
        if let Some(handler) = handler_table.get(&capture.name) {
            handler(capture, ctx, builder, source, config)?;
        }
    }
    for capture in ctx.captures.iter().filter(|c| c.category() == Category::Decorator) {
        if let Some(handler) = handler_table.get(&capture.name) {
            handler(capture, ctx, builder, source, config)?;
        }
    }
    builder.pending_docs.clear();
    Ok(())
}

/// Mutable pass-3 scratch state, later consumed by [`DefinitionBuilder::into_index`].
pub struct DefinitionBuilder {
    file_path: String,
    functions: HashMap<SymbolId, FunctionDefinition>,
    classes: HashMap<SymbolId, ClassDefinition>,
    variables: HashMap<SymbolId, VariableDefinition>,
    interfaces: HashMap<SymbolId, InterfaceDefinition>,
    enums: HashMap<SymbolId, EnumDefinition>,
    namespaces: HashMap<SymbolId, NamespaceDefinition>,
    types: HashMap<SymbolId, TypeAliasDefinition>,
    imported_symbols: HashMap<SymbolId, ImportDefinition>,

    class_by_body_scope: HashMap<ScopeId, SymbolId>,
    interface_by_body_scope: HashMap<ScopeId, SymbolId>,
    enum_by_body_scope: HashMap<ScopeId, SymbolId>,
    namespace_by_body_scope: HashMap<ScopeId, SymbolId>,

    /// Pending documentation comments keyed by the location of the
    /// definition they are expected to attach to (§4.4.4). Anything left
    /// here when pass 3 ends is discarded.
    pending_docs: HashMap<Location, String>,
}

impl DefinitionBuilder {
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            functions: HashMap::new(),
            classes: HashMap::new(),
            variables: HashMap::new(),
            interfaces: HashMap::new(),
            enums: HashMap::new(),
            namespaces: HashMap::new(),
            types: HashMap::new(),
            imported_symbols: HashMap::new(),
            class_by_body_scope: HashMap::new(),
            interface_by_body_scope: HashMap::new(),
            enum_by_body_scope: HashMap::new(),
            namespace_by_body_scope: HashMap::new(),
            pending_docs: HashMap::new(),
        }
    }

    fn symbol_id(&self, kind: &str, name: &str, location: &Location) -> SymbolId {
        SymbolId::new(kind, &self.file_path, name, &location.start)
    }

    // -- documentation (§4.4.4) ------------------------------------------------

    pub fn record_pending_doc(&mut self, anchor: Location, text: String) {
        self.pending_docs.insert(anchor, text);
    }

    pub fn take_pending_doc(&mut self, anchor: &Location) -> Option<String> {
        self.pending_docs.remove(anchor)
    }

    // -- functions --------------------------------------------------------------

    pub fn add_function(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        signature: codesearch_core::definitions::FunctionSignature,
        docstring: Option<String>,
        is_async: bool,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("function", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.functions.insert(
            symbol_id.clone(),
            FunctionDefinition {
                common,
                signature,
                docstring,
                is_async,
            },
        );
        Ok(symbol_id)
    }

    // -- classes / methods / properties ------------------------------------------

    #[allow(clippy::too_many_arguments)]
    pub fn add_class(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        body_scope_id: ScopeId,
        extends: Vec<String>,
        implements: Vec<String>,
        type_parameters: Vec<String>,
        is_abstract: Option<bool>,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("class", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.classes.insert(
            symbol_id.clone(),
            ClassDefinition {
                common,
                methods: Vec::new(),
                properties: Vec::new(),
                constructor: None,
                extends,
                implements,
                type_parameters,
                decorators: Vec::new(),
                is_abstract,
            },
        );
        self.class_by_body_scope.insert(body_scope_id, symbol_id.clone());
        Ok(symbol_id)
    }

    fn class_mut(&mut self, body_scope_id: &ScopeId) -> Result<&mut ClassDefinition> {
        let symbol_id = self
            .class_by_body_scope
            .get(body_scope_id)
            .cloned()
            .ok_or_else(|| Error::missing_child_scope(body_scope_id.to_string(), "<class>"))?;
        self.classes
            .get_mut(&symbol_id)
            .ok_or_else(|| Error::invalid_input(format!("class {symbol_id} missing from builder")))
    }

    pub fn add_method_to_class(&mut self, body_scope_id: &ScopeId, method: MethodDefinition) -> Result<()> {
        self.class_mut(body_scope_id)?.methods.push(method);
        Ok(())
    }

    pub fn set_constructor_for_class(&mut self, body_scope_id: &ScopeId, constructor: MethodDefinition) -> Result<()> {
        self.class_mut(body_scope_id)?.constructor = Some(constructor);
        Ok(())
    }

    pub fn add_property_to_class(&mut self, body_scope_id: &ScopeId, property: PropertyDefinition) -> Result<()> {
        self.class_mut(body_scope_id)?.properties.push(property);
        Ok(())
    }

    pub fn attach_decorator_to_class(&mut self, body_scope_id: &ScopeId, decorator: String) -> Result<()> {
        self.class_mut(body_scope_id)?.decorators.push(decorator);
        Ok(())
    }

    pub fn attach_decorator_to_method(&mut self, body_scope_id: &ScopeId, method_name: &str, decorator: String) -> Result<()> {
        let class = self.class_mut(body_scope_id)?;
        if let Some(method) = class.methods.iter_mut().find(|m| m.name == method_name) {
            method.decorators.push(decorator);
        }
        Ok(())
    }

    pub fn attach_decorator_to_property(&mut self, body_scope_id: &ScopeId, property_name: &str, decorator: String) -> Result<()> {
        let class = self.class_mut(body_scope_id)?;
        if let Some(property) = class.properties.iter_mut().find(|p| p.name == property_name) {
            property.decorators.push(decorator);
        }
        Ok(())
    }

    /// Routes `extra_body_scope_id` to the same class as `existing_body_scope_id`.
    ///
    /// A language whose type declaration and member list live in separate AST
    /// nodes - Rust's `struct`/`enum`/`trait` item plus however many `impl`
    /// blocks add methods to it - needs more than one scope id resolving to
    /// one `ClassDefinition`. Every `impl` block registers its own scope (so
    /// `get_child_scope_with_symbol_name` can find it), then aliases that
    /// scope here to the type's own body scope before adding methods to it.
    pub fn alias_class_body_scope(&mut self, existing_body_scope_id: &ScopeId, extra_body_scope_id: ScopeId) -> Result<()> {
        let symbol_id = self
            .class_by_body_scope
            .get(existing_body_scope_id)
            .cloned()
            .ok_or_else(|| Error::missing_child_scope(existing_body_scope_id.to_string(), "<class>"))?;
        self.class_by_body_scope.insert(extra_body_scope_id, symbol_id);
        Ok(())
    }

    /// Pushes `trait_name` onto the class's `implements` list - Rust's
    /// `impl Trait for Type` blocks are the only source of this data, since
    /// unlike `extends`/`implements` on a TS class declaration, a Rust
    /// `struct`/`enum` item never names the traits it implements itself.
    pub fn add_implements_to_class(&mut self, body_scope_id: &ScopeId, trait_name: String) -> Result<()> {
        self.class_mut(body_scope_id)?.implements.push(trait_name);
        Ok(())
    }

    // -- variables ----------------------------------------------------------------

    pub fn add_variable(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        kind_tag: VariableKindTag,
        type_annotation: Option<String>,
        derived_from: Option<SymbolName>,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("variable", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.variables.insert(
            symbol_id.clone(),
            VariableDefinition {
                common,
                kind_tag,
                type_annotation,
                derived_from,
            },
        );
        Ok(symbol_id)
    }

    // -- interfaces -----------------------------------------------------------------

    pub fn add_interface(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        body_scope_id: ScopeId,
        extends: Vec<String>,
        type_parameters: Vec<String>,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("interface", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.interfaces.insert(
            symbol_id.clone(),
            InterfaceDefinition {
                common,
                methods: Vec::new(),
                properties: Vec::new(),
                extends,
                type_parameters,
            },
        );
        self.interface_by_body_scope.insert(body_scope_id, symbol_id.clone());
        Ok(symbol_id)
    }

    fn interface_mut(&mut self, body_scope_id: &ScopeId) -> Result<&mut InterfaceDefinition> {
        let symbol_id = self
            .interface_by_body_scope
            .get(body_scope_id)
            .cloned()
            .ok_or_else(|| Error::missing_child_scope(body_scope_id.to_string(), "<interface>"))?;
        self.interfaces
            .get_mut(&symbol_id)
            .ok_or_else(|| Error::invalid_input(format!("interface {symbol_id} missing from builder")))
    }

    pub fn add_method_to_interface(&mut self, body_scope_id: &ScopeId, method: InterfaceMethod) -> Result<()> {
        self.interface_mut(body_scope_id)?.methods.push(method);
        Ok(())
    }

    pub fn add_property_to_interface(&mut self, body_scope_id: &ScopeId, property: PropertyDefinition) -> Result<()> {
        self.interface_mut(body_scope_id)?.properties.push(property);
        Ok(())
    }

    // -- enums ------------------------------------------------------------------------

    pub fn add_enum(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        body_scope_id: Option<ScopeId>,
        is_const: bool,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("enum", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.enums.insert(
            symbol_id.clone(),
            EnumDefinition {
                common,
                members: Vec::new(),
                is_const,
            },
        );
        if let Some(body_scope_id) = body_scope_id {
            self.enum_by_body_scope.insert(body_scope_id, symbol_id.clone());
        }
        Ok(symbol_id)
    }

    pub fn add_member_to_enum(&mut self, enum_symbol_id: &SymbolId, member: EnumMember) -> Result<()> {
        self.enums
            .get_mut(enum_symbol_id)
            .ok_or_else(|| Error::invalid_input(format!("enum {enum_symbol_id} missing from builder")))?
            .members
            .push(member);
        Ok(())
    }

    pub fn add_member_to_enum_by_scope(&mut self, body_scope_id: &ScopeId, member: EnumMember) -> Result<()> {
        let symbol_id = self
            .enum_by_body_scope
            .get(body_scope_id)
            .cloned()
            .ok_or_else(|| Error::missing_child_scope(body_scope_id.to_string(), "<enum>"))?;
        self.add_member_to_enum(&symbol_id, member)
    }

    // -- namespaces --------------------------------------------------------------------

    pub fn add_namespace(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        body_scope_id: ScopeId,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("namespace", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.namespaces.insert(
            symbol_id.clone(),
            NamespaceDefinition {
                common,
                member_symbol_ids: Vec::new(),
            },
        );
        self.namespace_by_body_scope.insert(body_scope_id, symbol_id.clone());
        Ok(symbol_id)
    }

    /// Registers `member_symbol_id` as belonging to the namespace whose body
    /// scope is `body_scope_id`, if one has been added yet. A definition
    /// built before its enclosing namespace (impossible in document order
    /// for well-formed input) is silently not registered.
    pub fn register_namespace_member(&mut self, body_scope_id: &ScopeId, member_symbol_id: String) {
        if let Some(ns_id) = self.namespace_by_body_scope.get(body_scope_id).cloned() {
            if let Some(ns) = self.namespaces.get_mut(&ns_id) {
                ns.member_symbol_ids.push(member_symbol_id);
            }
        }
    }

    // -- type aliases --------------------------------------------------------------------

    pub fn add_type_alias(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        type_parameters: Vec<String>,
        underlying_type: String,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("type_alias", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.types.insert(
            symbol_id.clone(),
            TypeAliasDefinition {
                common,
                type_parameters,
                underlying_type,
            },
        );
        Ok(symbol_id)
    }

    // -- imports ---------------------------------------------------------------------------

    pub fn add_import(
        &mut self,
        ctx: &ProcessingContext,
        name: SymbolName,
        location: Location,
        import_path: String,
        import_kind: ImportKind,
        imported_name: Option<SymbolName>,
        export: Option<ExportInfo>,
    ) -> Result<SymbolId> {
        let defining_scope_id = ctx.get_scope_id(&location)?;
        let symbol_id = self.symbol_id("import", &name, &location);
        let mut common = codesearch_core::definitions::DefinitionCommon::new(
            symbol_id.clone(),
            name,
            location,
            defining_scope_id,
        );
        if let Some(export) = export {
            common = common.with_export(export);
        }
        self.imported_symbols.insert(
            symbol_id.clone(),
            ImportDefinition {
                common,
                import_path,
                import_kind,
                imported_name,
            },
        );
        Ok(symbol_id)
    }

    /// Assembles the immutable `SemanticIndex`. `scopes` and `references`
    /// are filled in by the caller afterward (`lib.rs::build_semantic_index`)
    /// since this builder never owned them.
    pub fn into_index(self, language: Language, root_scope_id: ScopeId) -> SemanticIndex {
        SemanticIndex {
            file_path: self.file_path,
            language: Some(language),
            root_scope_id: Some(root_scope_id),
            scopes: HashMap::new(),
            functions: self.functions,
            classes: self.classes,
            variables: self.variables,
            interfaces: self.interfaces,
            enums: self.enums,
            namespaces: self.namespaces,
            types: self.types,
            imported_symbols: self.imported_symbols,
            references: Vec::new(),
        }
    }
}

/// Walks up from `node` looking for an enclosing direct export statement,
/// stopping (returning `None`) the moment `is_boundary` reports that the
/// walk has crossed a function/class body or an object/array literal
/// (§4.4.2's nested-exported-literal rule) before any export was found.
pub fn detect_export(
    node: Node,
    is_boundary: impl Fn(Node) -> bool,
    classify_export: impl Fn(Node) -> Option<ExportInfo>,
) -> Option<ExportInfo> {
    let mut current = node.parent();
    while let Some(n) = current {
        if let Some(info) = classify_export(n) {
            return Some(info);
        }
        if is_boundary(n) {
            return None;
        }
        current = n.parent();
    }
    None
}

/// Generic derived-variable detection (§4.4.3): an initializer shaped like
/// `IDENT.method(...)` records `IDENT` as `derived_from`. `call_kinds` and
/// `member_kinds` are the grammar's node kinds for a call and a member/
/// attribute access; `object_field` is the field name on the member node
/// holding the receiver.
pub fn derived_from(
    initializer: Node,
    source: &str,
    call_kinds: &[&str],
    member_kinds: &[&str],
    object_field: &str,
) -> Option<SymbolName> {
    if !call_kinds.contains(&initializer.kind()) {
        return None;
    }
    let callee = initializer
        .child_by_field_name("function")
        .or_else(|| initializer.child_by_field_name("attribute"))?;
    if !member_kinds.contains(&callee.kind()) {
        return None;
    }
    let receiver = callee.child_by_field_name(object_field)?;
    if receiver.kind() != "identifier" {
        return None;
    }
    Some(crate::node_ext::node_text(receiver, source).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesearch_core::ids::Position;
    use std::collections::HashMap as Map;

    fn loc(sl: usize, sc: usize, el: usize, ec: usize) -> Location {
        Location::new("f.ts", Position::new(sl, sc), Position::new(el, ec))
    }

    fn make_ctx() -> ProcessingContext<'static> {
        let root_loc = loc(1, 1, 10, 1);
        let root_id = ScopeId::new("module", &root_loc);
        let mut scopes = Map::new();
        scopes.insert(
            root_id.clone(),
            codesearch_core::scope::LexicalScope::new_root(root_loc),
        );
        let mut depths = Map::new();
        depths.insert(root_id.clone(), 0);
        ProcessingContext::new(&[], scopes, depths, root_id)
    }

    #[test]
    fn add_function_sets_defining_scope_to_root() {
        let ctx = make_ctx();
        let mut builder = DefinitionBuilder::new("f.ts".to_string());
        let id = builder
            .add_function(
                &ctx,
                "foo".to_string(),
                loc(2, 1, 2, 10),
                codesearch_core::definitions::FunctionSignature::default(),
                None,
                false,
                None,
            )
            .expect("add_function");
        let index = builder.into_index(Language::TypeScript, ctx.root_scope_id.clone());
        assert!(index.functions.contains_key(&id));
    }

    #[test]
    fn add_method_to_class_requires_registered_body_scope() {
        let mut builder = DefinitionBuilder::new("f.ts".to_string());
        let method = MethodDefinition {
            symbol_id: SymbolId::new("method", "f.ts", "m", &Position::new(1, 1)),
            name: "m".to_string(),
            location: loc(1, 1, 1, 5),
            defining_scope_id: ScopeId::new("class", &loc(1, 1, 5, 1)),
            signature: codesearch_core::definitions::FunctionSignature::default(),
            docstring: None,
            is_static: false,
            is_abstract: false,
            is_async: false,
            decorators: Vec::new(),
        };
        let err = builder
            .add_method_to_class(&ScopeId::new("class", &loc(1, 1, 5, 1)), method)
            .unwrap_err();
        assert!(err.to_string().contains("class"));
    }

    #[test]
    fn pending_doc_round_trips() {
        let mut builder = DefinitionBuilder::new("f.ts".to_string());
        let anchor = loc(3, 1, 3, 1);
        builder.record_pending_doc(anchor.clone(), "/** doc */".to_string());
        assert_eq!(builder.take_pending_doc(&anchor), Some("/** doc */".to_string()));
        assert_eq!(builder.take_pending_doc(&anchor), None);
    }
}
