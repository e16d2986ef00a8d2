//! Python support: query, scope boundaries, metadata extraction, and the
//! definition-builder handler table (`SPEC_FULL.md` §4.6).
//!
//! Python has no dedicated method-definition node kind - a method is just a
//! `function_definition` whose immediate enclosing block belongs to a
//! `class_definition`, so `handle_function` branches on that ancestry the
//! same way JavaScript's `handle_method` resolves its enclosing class.
//! Decorators sit as preceding siblings of the definition they decorate
//! inside a wrapping `decorated_definition` node rather than a flat
//! "decorator capture, then its target" relationship as in TypeScript.

use crate::capture::Capture;
use crate::context::ProcessingContext;
use crate::definition_builder::{derived_from, DefinitionBuilder, HandlerFn, HandlerTable};
use crate::extractors::{AssignmentParts, MetadataExtractor, ReceiverInfo, ScopeBoundary, ScopeBoundaryExtractor};
use crate::node_ext::{find_ancestor, has_child_of_kind, node_location, node_text, require_field};
use crate::LanguageRegistry;
use codesearch_core::capture::Category;
use codesearch_core::definitions::{ExportInfo, FunctionSignature, MethodDefinition, Parameter, VariableKindTag};
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::{Location, SymbolId};
use codesearch_core::references::{PropertyChain, SelfKeyword, TypeCertainty, TypeInfo};
use codesearch_core::IndexerConfig;
use tree_sitter::Node;

pub const QUERY: &str = r#"
(function_definition name: (identifier) @definition.function) @scope.function
(class_definition name: (identifier) @definition.class) @scope.class
(lambda) @scope.function
(assignment left: (identifier) @definition.variable)
(import_statement) @import.named
(import_from_statement) @import.named
(decorator) @decorator.attach
(call) @reference.call
(attribute) @reference.property
(assignment) @assignment.write
(return_statement) @return.value
"#;

/// Python's scope-bearing node kinds are function/class bodies plus lambda
/// expressions; `decorated_definition` itself never spans a new scope, it
/// just wraps one.
fn is_body_boundary(node: Node) -> bool {
    matches!(node.kind(), "function_definition" | "class_definition" | "lambda")
}

pub struct PyScopeExtractor;

impl ScopeBoundaryExtractor for PyScopeExtractor {
    fn extract(&self, node: Node, source: &str, file_path: &str) -> Result<ScopeBoundary> {
        match node.kind() {
            "function_definition" | "class_definition" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "lambda" => {
                let anchor = node.child_by_field_name("parameters").unwrap_or(node);
                let body = node.child_by_field_name("body").unwrap_or(node);
                Ok(ScopeBoundary {
                    symbol_location: node_location(anchor, file_path),
                    scope_location: node_location(body, file_path),
                    name: None,
                })
            }
            other => Err(Error::unrecognized_scope_node("python", other)),
        }
    }

    /// Indentation-delimited scopes are nested spatially but not always
    /// produced in an order where a container is processed before the
    /// scopes textually inside it; sort by containment first (§4.2).
    fn requires_containment_sort(&self) -> bool {
        true
    }
}

pub struct PyMetadataExtractor;

/// Walks an `attribute`/`subscript` chain down to its root identifier or
/// `call` (e.g. `self.x.y` or `super().foo`), collecting names outer-to-inner.
fn build_attribute_chain(node: Node, source: &str) -> (PropertyChain, Option<Node>) {
    let mut chain = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "attribute" => {
                let Some(attr) = current.child_by_field_name("attribute") else { break };
                chain.push(node_text(attr, source).to_string());
                let Some(object) = current.child_by_field_name("object") else { break };
                current = object;
            }
            "subscript" => {
                let Some(index) = current.child_by_field_name("subscript") else { break };
                chain.push(node_text(index, source).trim_matches(|c| c == '"' || c == '\'').to_string());
                let Some(value) = current.child_by_field_name("value") else { break };
                current = value;
            }
            "identifier" | "call" => break,
            _ => break,
        }
    }
    chain.reverse();
    (chain, Some(current))
}

/// `true` if `node` is a zero-argument call to the builtin `super`.
fn is_super_call(node: Node, source: &str) -> bool {
    node.kind() == "call" && node.child_by_field_name("function").map(|f| node_text(f, source) == "super").unwrap_or(false)
}

impl MetadataExtractor for PyMetadataExtractor {
    fn extract_type_from_annotation(&self, node: Node, source: &str) -> Option<TypeInfo> {
        let type_node = node.child_by_field_name("type").or_else(|| node.child_by_field_name("return_type"))?;
        let text = node_text(type_node, source);
        Some(TypeInfo {
            type_name: text.trim_start_matches("->").trim().to_string(),
            certainty: TypeCertainty::Declared,
            is_nullable: text.contains("Optional") || text.contains("None"),
            type_arguments: None,
        })
    }

    fn extract_receiver_info(&self, node: Node, source: &str, file_path: &str) -> Option<ReceiverInfo> {
        let callee = match node.kind() {
            "call" => node.child_by_field_name("function")?,
            "attribute" => node,
            _ => return None,
        };
        if callee.kind() != "attribute" {
            return None;
        }
        let object = callee.child_by_field_name("object")?;
        let (mut chain, root) = build_attribute_chain(callee, source);
        let property = callee.child_by_field_name("attribute")?;
        if chain.last().map(String::as_str) != Some(node_text(property, source)) {
            chain.push(node_text(property, source).to_string());
        }
        let object_text = node_text(object, source);
        let is_self = object_text == "self" || is_super_call(object, source);
        let self_keyword = if is_self { Some(SelfKeyword::SelfLower) } else { None };
        Some(ReceiverInfo {
            receiver_location: root.map(|r| node_location(r, file_path)),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword,
        })
    }

    fn extract_call_receiver(&self, node: Node, file_path: &str) -> Option<Location> {
        let callee = node.child_by_field_name("function")?;
        let object = callee.child_by_field_name("object")?;
        Some(node_location(object, file_path))
    }

    fn extract_property_chain(&self, node: Node, source: &str) -> Option<PropertyChain> {
        let (chain, _) = build_attribute_chain(node, source);
        if chain.is_empty() {
            None
        } else {
            Some(chain)
        }
    }

    fn extract_assignment_parts(&self, node: Node, file_path: &str) -> AssignmentParts {
        AssignmentParts {
            source: node.child_by_field_name("right").map(|n| node_location(n, file_path)),
            target: node.child_by_field_name("left").map(|n| node_location(n, file_path)),
        }
    }

    fn extract_construct_target(&self, node: Node, file_path: &str) -> Option<Location> {
        let parent = node.parent()?;
        match parent.kind() {
            "assignment" => parent.child_by_field_name("left").map(|n| node_location(n, file_path)),
            _ => None,
        }
    }

    fn is_method_call(&self, node: Node) -> bool {
        node.child_by_field_name("function").map(|f| f.kind() == "attribute").unwrap_or(false)
    }
}

/// Python has no export statements; every module-level binding is visible to
/// importers, so `export_info_for` always returns `None` here. Kept as a
/// function (rather than inlined `None`) to mirror the JS/TS call shape.
fn export_info_for(_node: Node) -> Option<ExportInfo> {
    None
}

fn extract_parameters(params_node: Node, source: &str) -> Vec<Parameter> {
    let mut cursor = params_node.walk();
    params_node
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "identifier" => Some(Parameter {
                name: node_text(p, source).to_string(),
                type_annotation: None,
                default_value: None,
                is_variadic: false,
            }),
            "typed_parameter" => {
                let name_node = p.named_child(0)?;
                let type_annotation = p.child_by_field_name("type").map(|t| node_text(t, source).to_string());
                Some(Parameter {
                    name: node_text(name_node, source).to_string(),
                    type_annotation,
                    default_value: None,
                    is_variadic: false,
                })
            }
            "default_parameter" | "typed_default_parameter" => {
                let name_node = p.child_by_field_name("name")?;
                let value = p.child_by_field_name("value").map(|v| node_text(v, source).to_string());
                let type_annotation = p.child_by_field_name("type").map(|t| node_text(t, source).to_string());
                Some(Parameter {
                    name: node_text(name_node, source).to_string(),
                    type_annotation,
                    default_value: value,
                    is_variadic: false,
                })
            }
            "list_splat_pattern" | "dictionary_splat_pattern" => p.named_child(0).map(|inner| Parameter {
                name: node_text(inner, source).to_string(),
                type_annotation: None,
                default_value: None,
                is_variadic: true,
            }),
            _ => None,
        })
        .collect()
}

/// Collects the decorator texts attached to `definition` via its wrapping
/// `decorated_definition`, in source order.
fn decorators_for(definition: Node, source: &str) -> Vec<String> {
    let Some(parent) = definition.parent() else { return Vec::new() };
    if parent.kind() != "decorated_definition" {
        return Vec::new();
    }
    let mut cursor = parent.walk();
    parent
        .named_children(&mut cursor)
        .take_while(|c| c.kind() != definition.kind() || c.start_byte() != definition.start_byte())
        .filter(|c| c.kind() == "decorator")
        .map(|d| node_text(d, source).to_string())
        .collect()
}

/// Reads a docstring from a definition body's first statement, if it is a
/// bare string expression (§4.4.4's Python-specific documentation form).
fn docstring_for(body: Node, source: &str) -> Option<String> {
    let mut cursor = body.walk();
    let first = body.named_children(&mut cursor).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    Some(node_text(expr, source).to_string())
}

fn handle_function(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    // `@definition.function` binds to the `name:` identifier, not the
    // enclosing `function_definition` - recover the declaration via its
    // parent before reaching for any other field.
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let params = require_field(node, "parameters")?;
    let return_type = node.child_by_field_name("return_type").map(|t| node_text(t, source).to_string());
    let signature = FunctionSignature {
        parameters: extract_parameters(params, source),
        return_type,
    };
    let is_async = has_child_of_kind(node, "async");
    let body = require_field(node, "body")?;
    let docstring = docstring_for(body, source);
    let decorators = decorators_for(node, source);

    let class_node = find_ancestor(node, |n| n.kind() == "class_definition");
    match class_node {
        None => {
            let export = export_info_for(node);
            builder.add_function(ctx, name, capture.location.clone(), signature, docstring, is_async, export)?;
        }
        Some(class_node) => {
            let class_name_node = require_field(class_node, "name")?;
            let class_name = node_text(class_name_node, source).to_string();
            let class_name_location = node_location(class_name_node, &capture.location.file_path);
            let enclosing = ctx.get_scope_id(&class_name_location)?;
            let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;
            let is_static = decorators.iter().any(|d| d.contains("staticmethod"));
            let symbol_id = SymbolId::new("method", &capture.location.file_path, &name, &capture.location.start);
            let method = MethodDefinition {
                symbol_id,
                name: name.clone(),
                location: capture.location.clone(),
                defining_scope_id: body_scope_id.clone(),
                signature,
                docstring,
                is_static,
                is_abstract: decorators.iter().any(|d| d.contains("abstractmethod")),
                is_async,
                decorators,
            };
            if name == "__init__" {
                builder.set_constructor_for_class(&body_scope_id, method)?;
            } else {
                builder.add_method_to_class(&body_scope_id, method)?;
            }
        }
    }
    Ok(())
}

fn handle_class(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;

    let extends = node
        .child_by_field_name("superclasses")
        .map(|args| {
            let mut cursor = args.walk();
            args.named_children(&mut cursor).map(|a| node_text(a, source).to_string()).collect()
        })
        .unwrap_or_default();

    let export = export_info_for(node);
    builder.add_class(ctx, name, capture.location.clone(), body_scope_id, extends, Vec::new(), Vec::new(), None, export)?;
    Ok(())
}

fn handle_variable(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    // `@definition.variable` binds to the `left:` identifier; its parent is
    // the `assignment` node holding the type annotation and initializer.
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;

    // Only module- and class-level bindings are definitions; a plain
    // assignment inside a function body is local and already covered by the
    // enclosing function's own scope, not a separate definition (§4.4).
    if find_ancestor(node, |n| matches!(n.kind(), "function_definition" | "lambda")).is_some() {
        return Ok(());
    }

    let kind_tag = if name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit()) && name.chars().any(char::is_alphabetic) {
        VariableKindTag::Constant
    } else {
        VariableKindTag::Var
    };

    let type_annotation = node.child_by_field_name("type").map(|t| node_text(t, source).to_string());
    let derived_from_name = node
        .child_by_field_name("right")
        .and_then(|init| derived_from(init, source, &["call"], &["attribute"], "object"));

    let export = export_info_for(node);
    builder.add_variable(ctx, name, capture.location.clone(), kind_tag, type_annotation, derived_from_name, export)?;
    Ok(())
}

fn handle_import(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node;
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "dotted_name" => {
                        let path = node_text(child, source).to_string();
                        let name = path.split('.').next_back().unwrap_or(&path).to_string();
                        builder.add_import(
                            ctx,
                            name,
                            node_location(child, &capture.location.file_path),
                            path,
                            codesearch_core::definitions::ImportKind::Default,
                            None,
                            None,
                        )?;
                    }
                    "aliased_import" => {
                        let Some(dotted) = child.child_by_field_name("name") else { continue };
                        let Some(alias) = child.child_by_field_name("alias") else { continue };
                        let path = node_text(dotted, source).to_string();
                        let local = node_text(alias, source).to_string();
                        builder.add_import(
                            ctx,
                            local,
                            node_location(child, &capture.location.file_path),
                            path,
                            codesearch_core::definitions::ImportKind::Default,
                            None,
                            None,
                        )?;
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .map(|m| node_text(m, source).to_string())
                .unwrap_or_default();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "dotted_name" if node_text(child, source) != module => {
                        let name = node_text(child, source).to_string();
                        builder.add_import(
                            ctx,
                            name.clone(),
                            node_location(child, &capture.location.file_path),
                            module.clone(),
                            codesearch_core::definitions::ImportKind::Named,
                            Some(name),
                            None,
                        )?;
                    }
                    "aliased_import" => {
                        let Some(original) = child.child_by_field_name("name") else { continue };
                        let Some(alias) = child.child_by_field_name("alias") else { continue };
                        let imported_name = node_text(original, source).to_string();
                        let local = node_text(alias, source).to_string();
                        builder.add_import(
                            ctx,
                            local,
                            node_location(child, &capture.location.file_path),
                            module.clone(),
                            codesearch_core::definitions::ImportKind::Named,
                            Some(imported_name),
                            None,
                        )?;
                    }
                    "wildcard_import" => {
                        builder.add_import(
                            ctx,
                            "*".to_string(),
                            node_location(child, &capture.location.file_path),
                            module.clone(),
                            codesearch_core::definitions::ImportKind::Namespace,
                            None,
                            None,
                        )?;
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Attaches a decorator to the class/function it wraps. Decorators are
/// processed in pass 3's second sub-pass after every definition already
/// exists (`definition_builder::run`), so the target's scope is always
/// resolvable by the time this handler runs.
fn handle_decorator(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node;
    let text = node_text(node, source).to_string();
    let Some(parent) = node.parent() else { return Ok(()) };
    if parent.kind() != "decorated_definition" {
        return Ok(());
    }
    let Some(target) = parent.child_by_field_name("definition") else { return Ok(()) };

    match target.kind() {
        "class_definition" => {
            let name_node = require_field(target, "name")?;
            let name = node_text(name_node, source).to_string();
            let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&node_location(target, &capture.location.file_path))?, &name)?;
            builder.attach_decorator_to_class(&body_scope_id, text)?;
        }
        "function_definition" => {
            let class_node = find_ancestor(target, |n| n.kind() == "class_definition");
            if let Some(class_node) = class_node {
                let class_name_node = require_field(class_node, "name")?;
                let class_name = node_text(class_name_node, source).to_string();
                let class_name_location = node_location(class_name_node, &capture.location.file_path);
                let enclosing = ctx.get_scope_id(&class_name_location)?;
                let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &class_name)?;
                let method_name_node = require_field(target, "name")?;
                let method_name = node_text(method_name_node, source).to_string();
                builder.attach_decorator_to_method(&body_scope_id, &method_name, text)?;
            }
            // A decorated module-level function already recorded its own
            // decorator list from `decorators_for` in `handle_function`; a
            // `@staticmethod`/`@abstractmethod` marker on a method likewise
            // reached `decorators_for` directly, so no separate attachment
            // is needed there. This arm only covers class-level decorators
            // applied to a method that need the class's decorator list
            // updated too (no-op today - kept for symmetry with TypeScript).
        }
        _ => {}
    }
    Ok(())
}

pub struct PyRegistry {
    handlers: HandlerTable,
}

impl PyRegistry {
    pub fn new() -> Self {
        let handlers = HandlerTable::builder()
            .on(Category::Definition, "function", handle_function as HandlerFn)
            .on(Category::Definition, "class", handle_class as HandlerFn)
            .on(Category::Definition, "variable", handle_variable as HandlerFn)
            .on(Category::Import, "named", handle_import as HandlerFn)
            .on(Category::Decorator, "attach", handle_decorator as HandlerFn)
            .build();
        Self { handlers }
    }
}

impl Default for PyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry for PyRegistry {
    fn query(&self) -> &'static str {
        QUERY
    }

    fn scope_boundary_extractor(&self) -> &dyn ScopeBoundaryExtractor {
        &PyScopeExtractor
    }

    fn metadata_extractor(&self) -> &dyn MetadataExtractor {
        &PyMetadataExtractor
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.handlers
    }
}

pub fn registry() -> PyRegistry {
    PyRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn scope_extractor_reports_function_body_as_scope() {
        let source = "def foo(a, b):\n    return a + b\n";
        let tree = parse(source);
        let function_node = tree.root_node().named_child(0).expect("function_definition");
        let boundary = PyScopeExtractor.extract(function_node, source, "f.py").expect("extract");
        assert_eq!(boundary.name.as_deref(), Some("foo"));
    }

    #[test]
    fn attribute_chain_builder_orders_outer_to_inner() {
        let source = "api.users.list()\n";
        let tree = parse(source);
        let call = tree.root_node().named_child(0).expect("expression_statement").named_child(0).expect("call");
        let callee = call.child_by_field_name("function").expect("function field");
        let (chain, _) = build_attribute_chain(callee, source);
        assert_eq!(chain, vec!["api".to_string(), "users".to_string(), "list".to_string()]);
    }

    #[test]
    fn self_attribute_access_is_classified_as_self_reference() {
        let source = "class Foo:\n    def bar(self):\n        self.helper()\n";
        let tree = parse(source);
        let class_node = tree.root_node().named_child(0).expect("class_definition");
        let body = class_node.child_by_field_name("body").expect("body");
        let method = body.named_child(0).expect("function_definition");
        let method_body = method.child_by_field_name("body").expect("body");
        let stmt = method_body.named_child(0).expect("expression_statement");
        let call = stmt.named_child(0).expect("call");
        let info = PyMetadataExtractor.extract_receiver_info(call, source, "f.py").expect("receiver info");
        assert!(info.is_self_reference);
        assert_eq!(info.self_keyword, Some(SelfKeyword::SelfLower));
    }
}
