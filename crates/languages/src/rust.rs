//! Rust support: query, scope boundaries, metadata extraction, and the
//! definition-builder handler table (`SPEC_FULL.md` §4.6).
//!
//! Rust splits a type's member list away from its declaration: a `struct`,
//! `enum`, or `trait` item only introduces the name, and any number of
//! separate `impl` blocks (possibly in a different order, possibly for a
//! trait implementation) add methods to it. Every `impl` block registers its
//! own scope, named after the `Self` type it targets, and that scope is
//! aliased onto the type's own body scope via
//! [`crate::definition_builder::DefinitionBuilder::alias_class_body_scope`]
//! before any method is attached (§4.4.1's handler table dispatches the
//! same way regardless of which scope a method's enclosing `impl` owns).

use crate::capture::Capture;
use crate::context::ProcessingContext;
use crate::definition_builder::{derived_from, DefinitionBuilder, HandlerFn, HandlerTable};
use crate::extractors::{AssignmentParts, MetadataExtractor, ReceiverInfo, ScopeBoundary, ScopeBoundaryExtractor};
use crate::node_ext::{find_ancestor, has_child_of_kind, node_location, node_text, require_field};
use crate::LanguageRegistry;
use codesearch_core::capture::Category;
use codesearch_core::definitions::{
    EnumMember, ExportInfo, FunctionSignature, ImportKind, InterfaceMethod, MethodDefinition, Parameter, VariableKindTag,
};
use codesearch_core::error::{Error, Result};
use codesearch_core::ids::{Location, Position, ScopeId};
use codesearch_core::references::{PropertyChain, SelfKeyword, TypeCertainty, TypeInfo};
use codesearch_core::IndexerConfig;
use tree_sitter::Node;

pub const QUERY: &str = r#"
(function_item name: (identifier) @definition.function) @scope.function
(function_signature_item name: (identifier) @definition.interface.method)
(struct_item name: (type_identifier) @definition.class) @scope.class
(enum_item name: (type_identifier) @definition.enum) @scope.enum
(trait_item name: (type_identifier) @definition.interface) @scope.interface
(impl_item type: (_) @definition.impl) @scope.class
(mod_item name: (identifier) @definition.namespace body: (declaration_list)) @scope.namespace
(const_item name: (identifier) @definition.variable)
(static_item name: (identifier) @definition.variable)
(type_item name: (type_identifier) @definition.type_alias)
((line_comment) @definition.function.documentation . (function_item))
((block_comment) @definition.function.documentation . (function_item))
(use_declaration) @import.named
(attribute_item) @decorator.attach
(closure_expression) @scope.closure
(call_expression) @reference.call
(macro_invocation) @reference.call.macro
(field_expression) @reference.property
(assignment_expression) @assignment.write
(return_expression) @return.value
(if_expression consequence: (block) @scope.block)
(if_expression alternative: (else_clause (block) @scope.block))
(while_expression body: (block) @scope.block)
(loop_expression body: (block) @scope.block)
(for_expression body: (block) @scope.block)
(match_arm value: (block) @scope.block)
"#;

/// Reduces a type node down to the `type_identifier` naming it, stripping
/// generic arguments (`Foo<T>`), references (`&Foo`, `&mut Foo`), and
/// qualified-path wrappers so it matches the bare name a `struct`/`enum`
/// registers itself under.
fn base_type_name<'a>(node: Node<'a>, source: &'a str) -> String {
    match node.kind() {
        "generic_type" => node
            .child_by_field_name("type")
            .map(|t| base_type_name(t, source))
            .unwrap_or_else(|| node_text(node, source).to_string()),
        "reference_type" => node
            .child_by_field_name("type")
            .map(|t| base_type_name(t, source))
            .unwrap_or_else(|| node_text(node, source).to_string()),
        "scoped_type_identifier" => node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| node_text(node, source).to_string()),
        _ => node_text(node, source).to_string(),
    }
}

/// `true` if `node` carries the given keyword either as a direct anonymous
/// child token or inside a wrapping `function_modifiers` node - tree-sitter
/// grammars for Rust have varied on which shape they use across versions.
fn has_modifier(node: Node, source: &str, keyword: &str) -> bool {
    if has_child_of_kind(node, keyword) {
        return true;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() == "function_modifiers")
        .any(|m| node_text(m, source).split_whitespace().any(|w| w == keyword))
}

/// Resolves the already-registered body scope of the struct/enum/trait
/// named by `type_node`, as seen from `type_node`'s own position. `None`
/// when the type isn't visible from here (declared in another file, or
/// textually after this reference - §4.4's document-order dependency).
fn resolve_type_body_scope(ctx: &ProcessingContext, type_node: Node, source: &str, file_path: &str) -> Option<ScopeId> {
    let type_name = base_type_name(type_node, source);
    let type_name_location = node_location(type_node, file_path);
    let enclosing = ctx.get_scope_id(&type_name_location).ok()?;
    ctx.get_child_scope_with_symbol_name(&enclosing, &type_name).ok()
}

pub struct RustScopeExtractor;

impl ScopeBoundaryExtractor for RustScopeExtractor {
    fn extract(&self, node: Node, source: &str, file_path: &str) -> Result<ScopeBoundary> {
        match node.kind() {
            "function_item" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "closure_expression" => {
                let body = require_field(node, "body")?;
                let params = node.child_by_field_name("parameters").unwrap_or(node);
                Ok(ScopeBoundary {
                    symbol_location: node_location(params, file_path),
                    scope_location: node_location(body, file_path),
                    name: None,
                })
            }
            // A unit struct (`struct Foo;`) has no body field at all; the
            // scope still has to exist so `impl` blocks have somewhere to
            // attach methods, so its span is synthesized as everything
            // after the name to the end of the item (never including the
            // name itself - the critical boundary rule, §4.2).
            "struct_item" => {
                let name_node = require_field(node, "name")?;
                let scope_location = match node.child_by_field_name("body") {
                    Some(body) => node_location(body, file_path),
                    None => after_name_location(name_node, node, file_path),
                };
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location,
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "enum_item" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "trait_item" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            // The impl's own scope is named after the `Self` type so it can
            // be aliased onto that type's body scope (see module docs).
            "impl_item" => {
                let type_node = require_field(node, "type")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(type_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(base_type_name(type_node, source)),
                })
            }
            "mod_item" => {
                let name_node = require_field(node, "name")?;
                let body = require_field(node, "body")?;
                Ok(ScopeBoundary {
                    symbol_location: node_location(name_node, file_path),
                    scope_location: node_location(body, file_path),
                    name: Some(node_text(name_node, source).to_string()),
                })
            }
            "block" => Ok(ScopeBoundary {
                symbol_location: node_location(node, file_path),
                scope_location: node_location(node, file_path),
                name: None,
            }),
            other => Err(Error::unrecognized_scope_node("rust", other)),
        }
    }
}

fn after_name_location(name_node: Node, item_node: Node, file_path: &str) -> Location {
    let start = name_node.end_position();
    let end = item_node.end_position();
    Location::new(
        file_path.to_string(),
        Position::from_zero_based(start.row, start.column),
        Position::from_zero_based(end.row, end.column),
    )
}

pub struct RustMetadataExtractor;

/// Builds the property chain for a (possibly nested) `field_expression`,
/// ending with the final accessed field (§4.5.2's property-chain grammar).
/// Rust's member-access node is `field_expression`, the analogue of JS's
/// `member_expression`; there is no subscript/index-expression chain link
/// since `a[i].b` indexes rather than navigates a path.
fn build_property_chain(node: Node, source: &str) -> (PropertyChain, Option<Node>) {
    let mut chain = Vec::new();
    let mut current = node;
    loop {
        match current.kind() {
            "field_expression" => {
                let Some(field) = current.child_by_field_name("field") else { break };
                chain.push(node_text(field, source).to_string());
                let Some(value) = current.child_by_field_name("value") else { break };
                current = value;
            }
            "identifier" | "self" => break,
            _ => break,
        }
    }
    chain.reverse();
    (chain, Some(current))
}

impl MetadataExtractor for RustMetadataExtractor {
    fn extract_type_from_annotation(&self, node: Node, source: &str) -> Option<TypeInfo> {
        let type_node = node.child_by_field_name("type")?;
        let text = node_text(type_node, source);
        Some(TypeInfo {
            type_name: text.to_string(),
            certainty: TypeCertainty::Declared,
            is_nullable: text.starts_with("Option<"),
            type_arguments: None,
        })
    }

    fn extract_receiver_info(&self, node: Node, source: &str, file_path: &str) -> Option<ReceiverInfo> {
        let callee = match node.kind() {
            "call_expression" => node.child_by_field_name("function")?,
            "field_expression" => node,
            _ => return None,
        };
        if callee.kind() != "field_expression" {
            return None;
        }
        let value = callee.child_by_field_name("value")?;
        let (mut chain, root) = build_property_chain(callee, source);
        let field = callee.child_by_field_name("field")?;
        if chain.last().map(String::as_str) != Some(node_text(field, source)) {
            chain.push(node_text(field, source).to_string());
        }
        let is_self = value.kind() == "self";
        Some(ReceiverInfo {
            receiver_location: root.map(|r| node_location(r, file_path)),
            property_chain: chain,
            is_self_reference: is_self,
            self_keyword: is_self.then_some(SelfKeyword::This),
        })
    }

    fn extract_call_receiver(&self, node: Node, file_path: &str) -> Option<Location> {
        let callee = node.child_by_field_name("function")?;
        let value = callee.child_by_field_name("value")?;
        Some(node_location(value, file_path))
    }

    fn extract_property_chain(&self, node: Node, source: &str) -> Option<PropertyChain> {
        let (chain, _) = build_property_chain(node, source);
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
            "let_declaration" => parent.child_by_field_name("pattern").map(|n| node_location(n, file_path)),
            "assignment_expression" => parent.child_by_field_name("left").map(|n| node_location(n, file_path)),
            _ => None,
        }
    }

    fn extract_is_optional_chain(&self, node: Node) -> bool {
        // `?` is a postfix `try_expression` wrapping the call, not a token
        // inside the call node itself.
        node.parent().map(|p| p.kind() == "try_expression").unwrap_or(false)
    }

    fn is_method_call(&self, node: Node) -> bool {
        node.child_by_field_name("function").map(|f| f.kind() == "field_expression").unwrap_or(false)
    }
}

fn is_pub_item(node: Node) -> Option<ExportInfo> {
    let is_body_like = matches!(
        node.kind(),
        "function_item" | "struct_item" | "enum_item" | "trait_item" | "const_item" | "static_item" | "type_item" | "mod_item"
    );
    if !is_body_like {
        return None;
    }
    let mut cursor = node.walk();
    let is_pub = node.children(&mut cursor).any(|c| c.kind() == "visibility_modifier");
    is_pub.then(|| ExportInfo {
        exported_name: None,
        is_default: false,
        is_reexport: false,
    })
}

/// Rust has no enclosing export *statement* the way JS/TS do - visibility
/// is a modifier directly on the item - so this just inspects `node` itself
/// rather than walking ancestors via `detect_export`.
pub fn export_info_for(node: Node) -> Option<ExportInfo> {
    is_pub_item(node)
}

pub fn extract_parameters(params_node: Node, source: &str) -> Vec<Parameter> {
    let mut cursor = params_node.walk();
    params_node
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "parameter" => {
                let name = p.child_by_field_name("pattern")?;
                let type_annotation = p.child_by_field_name("type").map(|t| node_text(t, source).to_string());
                Some(Parameter {
                    name: node_text(name, source).to_string(),
                    type_annotation,
                    default_value: None,
                    is_variadic: false,
                })
            }
            "self_parameter" => None,
            "variadic_parameter" => Some(Parameter {
                name: node_text(p, source).to_string(),
                type_annotation: None,
                default_value: None,
                is_variadic: true,
            }),
            _ => None,
        })
        .collect()
}

fn handle_function(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    // `@definition.function` binds to the `name:` identifier, not the
    // enclosing `function_item` - recover the declaration via its parent
    // before reaching for any other field.
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?;
    let params = require_field(node, "parameters")?;
    let return_type = node.child_by_field_name("return_type").map(|t| node_text(t, source).to_string());
    let signature = FunctionSignature {
        parameters: extract_parameters(params, source),
        return_type,
    };
    let is_async = has_modifier(node, source, "async");
    let docstring = builder.take_pending_doc(&capture.location);

    match find_ancestor(node, |n| matches!(n.kind(), "impl_item" | "trait_item")) {
        None => {
            let export = export_info_for(node);
            builder.add_function(ctx, name, capture.location.clone(), signature, docstring, is_async, export)?;
        }
        Some(trait_node) if trait_node.kind() == "trait_item" => {
            let trait_name_node = require_field(trait_node, "name")?;
            let trait_name = node_text(trait_name_node, source).to_string();
            let trait_name_location = node_location(trait_name_node, &capture.location.file_path);
            let enclosing = ctx.get_scope_id(&trait_name_location)?;
            let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &trait_name)?;
            builder.add_method_to_interface(&body_scope_id, InterfaceMethod { name, location: capture.location.clone(), signature })?;
        }
        Some(impl_node) => {
            let type_node = require_field(impl_node, "type")?;
            let Some(body_scope_id) = resolve_type_body_scope(ctx, type_node, source, &capture.location.file_path) else {
                return Ok(());
            };
            let has_self = params.named_child(0).map(|p| p.kind() == "self_parameter").unwrap_or(false);
            let is_static = !has_self;
            let symbol_id = codesearch_core::ids::SymbolId::new("method", &capture.location.file_path, &name, &capture.location.start);
            let method = MethodDefinition {
                symbol_id,
                name: name.clone(),
                location: capture.location.clone(),
                defining_scope_id: body_scope_id.clone(),
                signature,
                docstring,
                is_static,
                is_abstract: false,
                is_async,
                decorators: Vec::new(),
            };
            // A scope found by name can, for an `impl` block that precedes
            // its own type's declaration in source order, resolve to the
            // `impl`'s own not-yet-aliased scope rather than the type's -
            // silently drop the method in that case instead of aborting the
            // whole file's definition pass (§7).
            if name == "new" && is_static {
                let _ = builder.set_constructor_for_class(&body_scope_id, method);
            } else {
                let _ = builder.add_method_to_class(&body_scope_id, method);
            }
        }
    }
    Ok(())
}

/// Records a `///`/`/** */` comment directly attached to a `function_item`
/// (free function or method - both share this node kind) so
/// `handle_function`'s `take_pending_doc` picks it up (§4.4.4). Only the
/// comment line immediately touching the item fires this handler; it then
/// walks backward over contiguous `///` siblings to reassemble a multi-line
/// doc comment into one string.
fn handle_doc_comment(capture: &Capture, _ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, config: &IndexerConfig) -> Result<()> {
    if !config.extract_documentation {
        return Ok(());
    }
    let text = node_text(capture.node, source);
    if !(text.starts_with("///") || text.starts_with("/**")) {
        return Ok(());
    }
    let Some(target) = capture.node.next_named_sibling() else {
        return Ok(());
    };
    let Some(name_node) = target.child_by_field_name("name").filter(|_| target.kind() == "function_item") else {
        return Ok(());
    };

    let mut lines = vec![text.to_string()];
    let mut cursor = capture.node;
    while let Some(prev) = cursor.prev_named_sibling() {
        if prev.kind() != capture.node.kind() {
            break;
        }
        let prev_text = node_text(prev, source);
        if !prev_text.starts_with("///") {
            break;
        }
        lines.push(prev_text.to_string());
        cursor = prev;
    }
    lines.reverse();

    let anchor = node_location(name_node, &capture.location.file_path);
    builder.record_pending_doc(anchor, lines.join("\n"));
    Ok(())
}

fn handle_interface_method(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // function_signature_item
    let params = require_field(node, "parameters")?;
    let return_type = node.child_by_field_name("return_type").map(|t| node_text(t, source).to_string());
    let signature = FunctionSignature {
        parameters: extract_parameters(params, source),
        return_type,
    };
    let Some(trait_node) = find_ancestor(node, |n| n.kind() == "trait_item") else {
        return Ok(());
    };
    let trait_name_node = require_field(trait_node, "name")?;
    let trait_name = node_text(trait_name_node, source).to_string();
    let trait_name_location = node_location(trait_name_node, &capture.location.file_path);
    let enclosing = ctx.get_scope_id(&trait_name_location)?;
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &trait_name)?;
    builder.add_method_to_interface(&body_scope_id, InterfaceMethod { name, location: capture.location.clone(), signature })?;
    Ok(())
}

fn handle_class(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // struct_item
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let export = export_info_for(node);
    builder.add_class(ctx, name, capture.location.clone(), body_scope_id, Vec::new(), Vec::new(), Vec::new(), None, export)?;
    Ok(())
}

fn handle_enum(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // enum_item
    let body = node.child_by_field_name("body");
    let body_scope_id = match body {
        Some(_) => Some(ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?),
        None => None,
    };
    let export = export_info_for(node);
    let enum_symbol_id = builder.add_enum(ctx, name, capture.location.clone(), body_scope_id.clone(), false, export)?;
    if let Some(body) = body {
        let mut cursor = body.walk();
        for variant in body.named_children(&mut cursor).filter(|c| c.kind() == "enum_variant") {
            let Some(variant_name) = variant.child_by_field_name("name") else { continue };
            let value = variant.child_by_field_name("value").map(|v| node_text(v, source).to_string());
            builder.add_member_to_enum(
                &enum_symbol_id,
                EnumMember {
                    name: node_text(variant_name, source).to_string(),
                    location: node_location(variant, &capture.location.file_path),
                    value,
                },
            )?;
        }
    }
    Ok(())
}

fn handle_interface(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // trait_item
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let extends = node
        .child_by_field_name("bounds")
        .map(|b| node_text(b, source).trim_start_matches(':').trim().to_string())
        .map(|b| b.split('+').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    let export = export_info_for(node);
    builder.add_interface(ctx, name, capture.location.clone(), body_scope_id, extends, Vec::new(), export)?;
    Ok(())
}

/// Links an `impl` block's own scope onto the struct/enum/trait it targets
/// (see module docs), and - for a trait impl - records the trait as one of
/// that type's `implements` entries.
fn handle_impl(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let type_node = capture.node;
    let Some(impl_node) = type_node.parent() else {
        return Err(Error::missing_field("impl_item", "type"));
    };
    let Some(target_body_scope_id) = resolve_type_body_scope(ctx, type_node, source, &capture.location.file_path) else {
        return Ok(());
    };
    if let Some(body) = impl_node.child_by_field_name("body") {
        let impl_body_scope_id = ctx.get_scope_id(&node_location(body, &capture.location.file_path))?;
        // See the matching comment in `handle_function`: when this `impl`
        // precedes its type's own declaration, `target_body_scope_id` can
        // be the impl's own scope rather than the type's, which isn't
        // registered as a class yet. Skip rather than fail the whole file.
        let _ = builder.alias_class_body_scope(&target_body_scope_id, impl_body_scope_id);
    }
    if let Some(trait_node) = impl_node.child_by_field_name("trait") {
        let trait_name = base_type_name(trait_node, source);
        let _ = builder.add_implements_to_class(&target_body_scope_id, trait_name);
    }
    Ok(())
}

fn handle_namespace(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // mod_item
    let body_scope_id = ctx.get_child_scope_with_symbol_name(&ctx.get_scope_id(&capture.location)?, &name)?;
    let export = export_info_for(node);
    builder.add_namespace(ctx, name, capture.location.clone(), body_scope_id, export)?;
    Ok(())
}

fn handle_variable(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // const_item | static_item
    let type_annotation = node.child_by_field_name("type").map(|t| node_text(t, source).to_string());
    let derived_from_name = node
        .child_by_field_name("value")
        .and_then(|init| derived_from(init, source, &["call_expression"], &["field_expression"], "value"));
    let export = export_info_for(node);
    builder.add_variable(ctx, name, capture.location.clone(), VariableKindTag::Const, type_annotation, derived_from_name, export)?;
    Ok(())
}

fn handle_type_alias(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let name_node = capture.node;
    let name = node_text(name_node, source).to_string();
    let node = crate::node_ext::require_parent(name_node)?; // type_item
    let underlying_type = node.child_by_field_name("type").map(|t| node_text(t, source).to_string()).unwrap_or_default();
    let type_parameters = node
        .child_by_field_name("type_parameters")
        .map(|tp| extract_type_parameters(tp, source))
        .unwrap_or_default();
    let export = export_info_for(node);
    builder.add_type_alias(ctx, name, capture.location.clone(), type_parameters, underlying_type, export)?;
    Ok(())
}

fn extract_type_parameters(node: Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| matches!(c.kind(), "type_identifier" | "lifetime" | "constrained_type_parameter"))
        .map(|c| node_text(c, source).to_string())
        .collect()
}

fn join_path(base: &str, rest: &str) -> String {
    if base.is_empty() {
        rest.to_string()
    } else {
        format!("{base}::{rest}")
    }
}

/// Recursively walks a `use_declaration`'s `argument` subtree, registering
/// one import per leaf name. Mirrors the node shapes documented on
/// `use_declaration` by tree-sitter-rust: a plain path, an `as`-aliased
/// path, a wildcard, or a brace-list of any of the above (possibly nested).
fn collect_use_argument(
    node: Node,
    base_path: &str,
    source: &str,
    ctx: &ProcessingContext,
    builder: &mut DefinitionBuilder,
    file_path: &str,
) -> Result<()> {
    match node.kind() {
        "identifier" => {
            let name = node_text(node, source).to_string();
            let path = join_path(base_path, &name);
            builder.add_import(ctx, name, node_location(node, file_path), path, ImportKind::Named, None, None)?;
        }
        "self" => {
            if let Some(last) = base_path.rsplit("::").next().filter(|s| !s.is_empty()) {
                let name = last.to_string();
                builder.add_import(ctx, name.clone(), node_location(node, file_path), base_path.to_string(), ImportKind::Named, Some(name), None)?;
            }
        }
        "scoped_identifier" => {
            let path_text = node_text(node, source).to_string();
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, source).to_string())
                .unwrap_or_else(|| path_text.clone());
            builder.add_import(ctx, name.clone(), node_location(node, file_path), path_text, ImportKind::Named, Some(name), None)?;
        }
        "use_as_clause" => {
            let Some(path) = node.child_by_field_name("path") else { return Ok(()) };
            let Some(alias) = node.child_by_field_name("alias") else { return Ok(()) };
            let imported_path = join_path(base_path, node_text(path, source));
            let imported_name = path.child_by_field_name("name").map(|n| node_text(n, source).to_string());
            let local = node_text(alias, source).to_string();
            builder.add_import(ctx, local, node_location(node, file_path), imported_path, ImportKind::Named, imported_name, None)?;
        }
        "use_wildcard" => {
            let path_text = node.named_child(0).map(|n| node_text(n, source).to_string()).unwrap_or_default();
            builder.add_import(
                ctx,
                "*".to_string(),
                node_location(node, file_path),
                join_path(base_path, &path_text),
                ImportKind::Namespace,
                None,
                None,
            )?;
        }
        "use_list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_use_argument(child, base_path, source, ctx, builder, file_path)?;
            }
        }
        "scoped_use_list" => {
            let Some(path) = node.child_by_field_name("path") else { return Ok(()) };
            let Some(list) = node.child_by_field_name("list") else { return Ok(()) };
            let nested_base = join_path(base_path, node_text(path, source));
            collect_use_argument(list, &nested_base, source, ctx, builder, file_path)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_import(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node; // use_declaration
    let Some(argument) = node.child_by_field_name("argument") else { return Ok(()) };
    collect_use_argument(argument, "", source, ctx, builder, &capture.location.file_path)
}

/// Attaches a `#[...]` attribute's raw text as a decorator on whichever
/// class/method/property it precedes - the closest forward sibling that
/// isn't itself another attribute (Rust attributes are direct preceding
/// siblings of their target, not a wrapping node the way Python decorators
/// are).
fn handle_decorator(capture: &Capture, ctx: &ProcessingContext, builder: &mut DefinitionBuilder, source: &str, _config: &IndexerConfig) -> Result<()> {
    let node = capture.node;
    let text = node_text(node, source).to_string();
    let mut target = node.next_sibling();
    while let Some(t) = target {
        if t.kind() == "attribute_item" || t.kind() == "line_comment" || t.kind() == "block_comment" {
            target = t.next_sibling();
            continue;
        }
        break;
    }
    let Some(target) = target else { return Ok(()) };
    match target.kind() {
        "struct_item" | "enum_item" | "trait_item" => {
            let Some(name_node) = target.child_by_field_name("name") else { return Ok(()) };
            let name = node_text(name_node, source).to_string();
            let enclosing = ctx.get_scope_id(&node_location(name_node, &capture.location.file_path))?;
            let body_scope_id = ctx.get_child_scope_with_symbol_name(&enclosing, &name)?;
            builder.attach_decorator_to_class(&body_scope_id, text)?;
        }
        "function_item" => {
            if let Some(impl_node) = find_ancestor(target, |n| n.kind() == "impl_item") {
                let Some(name_node) = target.child_by_field_name("name") else { return Ok(()) };
                let method_name = node_text(name_node, source).to_string();
                let type_node = impl_node.child_by_field_name("type");
                if let Some(type_node) = type_node {
                    if let Some(body_scope_id) = resolve_type_body_scope(ctx, type_node, source, &capture.location.file_path) {
                        builder.attach_decorator_to_method(&body_scope_id, &method_name, text)?;
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

pub struct RustRegistry {
    handlers: HandlerTable,
}

pub fn build_handler_table() -> HandlerTable {
    HandlerTable::builder()
        .on(Category::Definition, "function", handle_function as HandlerFn)
        .on(Category::Definition, "class", handle_class as HandlerFn)
        .on(Category::Definition, "enum", handle_enum as HandlerFn)
        .on(Category::Definition, "interface", handle_interface as HandlerFn)
        .on_subtag(Category::Definition, "interface", "method", handle_interface_method as HandlerFn)
        .on(Category::Definition, "impl", handle_impl as HandlerFn)
        .on(Category::Definition, "namespace", handle_namespace as HandlerFn)
        .on(Category::Definition, "variable", handle_variable as HandlerFn)
        .on(Category::Definition, "type_alias", handle_type_alias as HandlerFn)
        .on_subtag(Category::Definition, "function", "documentation", handle_doc_comment as HandlerFn)
        .on(Category::Import, "named", handle_import as HandlerFn)
        .on(Category::Decorator, "attach", handle_decorator as HandlerFn)
        .build()
}

impl RustRegistry {
    pub fn new() -> Self {
        Self { handlers: build_handler_table() }
    }
}

impl Default for RustRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageRegistry for RustRegistry {
    fn query(&self) -> &'static str {
        QUERY
    }

    fn scope_boundary_extractor(&self) -> &dyn ScopeBoundaryExtractor {
        &RustScopeExtractor
    }

    fn metadata_extractor(&self) -> &dyn MetadataExtractor {
        &RustMetadataExtractor
    }

    fn handler_table(&self) -> &HandlerTable {
        &self.handlers
    }
}

pub fn registry() -> RustRegistry {
    RustRegistry::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> tree_sitter::Tree {
        let language: tree_sitter::Language = tree_sitter_rust::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language).expect("set language");
        parser.parse(source, None).expect("parse")
    }

    #[test]
    fn scope_extractor_reports_function_body_as_scope() {
        let source = "fn foo(a: i32, b: i32) -> i32 { a + b }";
        let tree = parse(source);
        let function_node = tree.root_node().named_child(0).expect("function_item");
        let boundary = RustScopeExtractor.extract(function_node, source, "f.rs").expect("extract");
        assert_eq!(boundary.name.as_deref(), Some("foo"));
        assert!(boundary.scope_location.start.column > boundary.symbol_location.end.column);
    }

    #[test]
    fn unit_struct_gets_a_synthetic_scope_excluding_its_name() {
        let source = "struct Marker;";
        let tree = parse(source);
        let struct_node = tree.root_node().named_child(0).expect("struct_item");
        let boundary = RustScopeExtractor.extract(struct_node, source, "f.rs").expect("extract");
        assert_eq!(boundary.name.as_deref(), Some("Marker"));
        assert!(boundary.scope_location.start >= boundary.symbol_location.end);
    }

    #[test]
    fn property_chain_builder_orders_outer_to_inner() {
        let source = "self.inner.value";
        let tree = parse(source);
        let field_expr = tree
            .root_node()
            .named_child(0)
            .expect("expression_statement")
            .named_child(0)
            .expect("field_expression");
        let (chain, root) = build_property_chain(field_expr, source);
        assert_eq!(chain, vec!["inner".to_string(), "value".to_string()]);
        assert_eq!(root.map(|n| n.kind()), Some("self"));
    }

    #[test]
    fn base_type_name_strips_generic_arguments() {
        let source = "impl<T> Foo<T> { }";
        let tree = parse(source);
        let impl_node = tree.root_node().named_child(0).expect("impl_item");
        let type_node = impl_node.child_by_field_name("type").expect("type field");
        assert_eq!(base_type_name(type_node, source), "Foo");
    }

    #[test]
    fn has_modifier_detects_async_keyword() {
        let source = "async fn foo() { }";
        let tree = parse(source);
        let function_node = tree.root_node().named_child(0).expect("function_item");
        assert!(has_modifier(function_node, source, "async"));
    }
}
