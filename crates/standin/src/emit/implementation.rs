//! Synthetic implementation: the `Fake<Name>` class itself.
//!
//! One mutable behavior slot per member. Members without an inherited
//! body start at the mapper's default so the fake works with zero
//! configuration; members carrying a default body store a nullable
//! slot and fall through to `super` until configured.

use crate::defaults::{DefaultValueExpression, DefaultValueMapper};
use crate::generics::GenericResolution;
use crate::model::{Member, TypeDeclaration, TypeRef};

use super::{
    closure_type, fake_name, render_arguments, render_parameters, storage_closure_ref,
    type_argument_list, type_parameter_clause, EmitOptions,
};

pub(crate) fn emit_implementation(
    decl: &TypeDeclaration,
    resolution: &GenericResolution,
    mapper: &DefaultValueMapper,
    options: &EmitOptions,
    out: &mut String,
) {
    let clause = type_parameter_clause(&decl.generics);
    let type_args = type_argument_list(&decl.generics);

    let super_ref = if decl.kind.is_class() {
        let ctor_args: Vec<String> = decl
            .super_call_args
            .iter()
            .map(DefaultValueExpression::render)
            .collect();
        format!("{}{type_args}({})", decl.simple_name(), ctor_args.join(", "))
    } else {
        format!("{}{type_args}", decl.simple_name())
    };

    out.push_str(&format!(
        "class {}{} : {super_ref}{} {{\n",
        fake_name(decl),
        clause.inline,
        clause.where_clause
    ));

    for member in &decl.members {
        emit_fields(member, resolution, mapper, options, out);
    }

    for member in &decl.members {
        out.push('\n');
        if member.is_function() {
            emit_function_override(member, resolution, options, out);
        } else {
            emit_property_override(member, resolution, options, out);
        }
    }

    out.push_str("}\n");
}

fn emit_fields(
    member: &Member,
    resolution: &GenericResolution,
    mapper: &DefaultValueMapper,
    options: &EmitOptions,
    out: &mut String,
) {
    let name = &member.name;
    if member.is_function() {
        let closure = closure_type(member, resolution, true);
        if member.has_default {
            out.push_str(&format!(
                "    internal var {name}Behavior: ({closure})? = null\n"
            ));
        } else {
            let default = mapper
                .map_to_default(&storage_closure_ref(member, resolution))
                .render();
            out.push_str(&format!(
                "    internal var {name}Behavior: {closure} = {default}\n"
            ));
        }
    } else {
        let ty = resolution.storage_type(Some(name), &member.return_type);
        emit_accessor_field(name, "Getter", &format!("() -> {}", ty.render()), member, out, || {
            mapper.map_to_default(&TypeRef::function(vec![], ty.clone())).render()
        });
        if member.mutable {
            emit_accessor_field(
                name,
                "Setter",
                &format!("({}) -> Unit", ty.render()),
                member,
                out,
                || {
                    mapper
                        .map_to_default(&TypeRef::function(vec![ty.clone()], TypeRef::unit()))
                        .render()
                },
            );
        }
    }
    if options.counters {
        out.push_str(&format!("    val {name}CallCount = AtomicInteger(0)\n"));
    }
}

fn emit_accessor_field(
    name: &str,
    suffix: &str,
    closure: &str,
    member: &Member,
    out: &mut String,
    default: impl FnOnce() -> String,
) {
    if member.has_default {
        out.push_str(&format!(
            "    internal var {name}{suffix}: ({closure})? = null\n"
        ));
    } else {
        out.push_str(&format!(
            "    internal var {name}{suffix}: {closure} = {}\n",
            default()
        ));
    }
}

fn emit_function_override(
    member: &Member,
    resolution: &GenericResolution,
    options: &EmitOptions,
    out: &mut String,
) {
    let name = &member.name;
    let ctx = Some(name.as_str());
    let needs_cast = resolution.mentions_erased(ctx, &member.return_type);
    let clause = type_parameter_clause(&member.generics);
    let generics = if clause.inline.is_empty() {
        String::new()
    } else {
        format!("{} ", clause.inline)
    };
    let suspend = if member.is_suspend { "suspend " } else { "" };
    let rendered_return = member.return_type.render();
    let return_suffix = if rendered_return == "Unit" {
        String::new()
    } else {
        format!(": {rendered_return}")
    };
    let cast = if needs_cast {
        format!(" as {rendered_return}")
    } else {
        String::new()
    };
    let arguments = render_arguments(member);
    let call = format!("{name}Behavior({arguments})");

    if needs_cast {
        out.push_str("    @Suppress(\"UNCHECKED_CAST\")\n");
    }
    let signature = format!(
        "    override {suspend}fun {generics}{name}({}){return_suffix}{}",
        render_parameters(member),
        clause.where_clause
    );

    if !member.has_default && !options.counters {
        out.push_str(&format!("{signature} = {call}{cast}\n"));
        return;
    }

    out.push_str(&format!("{signature} {{\n"));
    if options.counters {
        out.push_str(&format!("        {name}CallCount.incrementAndGet()\n"));
    }
    if member.has_default {
        out.push_str(&format!("        val behavior = {name}Behavior\n"));
        out.push_str(&format!(
            "        return if (behavior != null) behavior({arguments}){cast} else super.{name}({arguments})\n"
        ));
    } else {
        out.push_str(&format!("        return {call}{cast}\n"));
    }
    out.push_str("    }\n");
}

fn emit_property_override(
    member: &Member,
    resolution: &GenericResolution,
    options: &EmitOptions,
    out: &mut String,
) {
    let name = &member.name;
    let keyword = if member.mutable { "var" } else { "val" };
    let ty = resolution
        .storage_type(Some(name.as_str()), &member.return_type)
        .render();
    out.push_str(&format!("    override {keyword} {name}: {ty}\n"));

    if !member.has_default && !options.counters {
        out.push_str(&format!("        get() = {name}Getter()\n"));
    } else {
        out.push_str("        get() {\n");
        if options.counters {
            out.push_str(&format!("            {name}CallCount.incrementAndGet()\n"));
        }
        if member.has_default {
            out.push_str(&format!("            val getter = {name}Getter\n"));
            out.push_str(&format!(
                "            return if (getter != null) getter() else super.{name}\n"
            ));
        } else {
            out.push_str(&format!("            return {name}Getter()\n"));
        }
        out.push_str("        }\n");
    }

    if !member.mutable {
        return;
    }
    if !member.has_default && !options.counters {
        out.push_str(&format!("        set(value) {{ {name}Setter(value) }}\n"));
    } else {
        out.push_str("        set(value) {\n");
        if options.counters {
            out.push_str(&format!("            {name}CallCount.incrementAndGet()\n"));
        }
        if member.has_default {
            out.push_str(&format!("            val setter = {name}Setter\n"));
            out.push_str(&format!(
                "            if (setter != null) setter(value) else super.{name} = value\n"
            ));
        } else {
            out.push_str(&format!("            {name}Setter(value)\n"));
        }
        out.push_str("        }\n");
    }
}

#[cfg(test)]
mod tests {
    use super::super::{emit_artifact, EmitOptions};
    use crate::defaults::DefaultValueMapper;
    use crate::generics::resolve;
    use crate::model::{analyze, parse_declaration_str};

    fn emit(yaml: &str, options: &EmitOptions) -> String {
        let mapper = DefaultValueMapper::new();
        let raw = parse_declaration_str(yaml).unwrap();
        let decl = analyze(&raw, &mapper).unwrap();
        let resolution = resolve(&decl);
        emit_artifact(&decl, &resolution, &mapper, options).source
    }

    const COUNTER: &str = r#"
name: com.example.Counter
kind: abstract_class
members:
  - name: increment
    returns: Int
  - name: reset
    has_default: true
    returns: Unit
"#;

    #[test]
    fn class_fake_extends_with_super_call() {
        let src = emit(COUNTER, &EmitOptions::default());
        assert!(src.contains("class FakeCounter : Counter() {"));
    }

    #[test]
    fn abstract_member_starts_at_mapper_default() {
        let src = emit(COUNTER, &EmitOptions::default());
        assert!(src.contains("internal var incrementBehavior: () -> Int = { 0 }"));
        assert!(src.contains("override fun increment(): Int = incrementBehavior()"));
    }

    #[test]
    fn default_body_member_falls_through_to_super() {
        let src = emit(COUNTER, &EmitOptions::default());
        assert!(src.contains("internal var resetBehavior: (() -> Unit)? = null"));
        assert!(src.contains("val behavior = resetBehavior"));
        assert!(src.contains("return if (behavior != null) behavior() else super.reset()"));
    }

    #[test]
    fn configuring_one_member_leaves_the_other_untouched() {
        // Two independent slots: replacing increment's closure cannot
        // reach reset's.
        let src = emit(COUNTER, &EmitOptions::default());
        assert!(src.contains("fake.incrementBehavior = behavior"));
        assert!(src.contains("fake.resetBehavior = behavior"));
        assert!(!src.contains("incrementBehavior = resetBehavior"));
    }

    #[test]
    fn super_constructor_arguments_are_synthesized() {
        let src = emit(
            r#"
name: com.example.Tagged
kind: open_class
constructors:
  - primary: true
    parameters:
      - name: tag
        type: String
      - name: weight
        type: Int
members:
  - name: describe
    returns: String
"#,
            &EmitOptions::default(),
        );
        assert!(src.contains("class FakeTagged : Tagged(\"\", 0) {"));
    }

    #[test]
    fn readonly_property_gets_getter_only() {
        let src = emit(
            r#"
name: com.example.Config
kind: interface
members:
  - name: label
    kind: property
    type: String
"#,
            &EmitOptions::default(),
        );
        assert!(src.contains("internal var labelGetter: () -> String = { \"\" }"));
        assert!(src.contains("override val label: String"));
        assert!(src.contains("get() = labelGetter()"));
        assert!(!src.contains("labelSetter"));
    }

    #[test]
    fn mutable_property_gets_accessor_pair() {
        let src = emit(
            r#"
name: com.example.Config
kind: interface
members:
  - name: label
    kind: property
    type: String
    mutable: true
"#,
            &EmitOptions::default(),
        );
        assert!(src.contains("internal var labelGetter: () -> String = { \"\" }"));
        assert!(src.contains("internal var labelSetter: (String) -> Unit = { Unit }"));
        assert!(src.contains("override var label: String"));
        assert!(src.contains("set(value) { labelSetter(value) }"));
    }

    #[test]
    fn counters_wrap_property_accessors() {
        let src = emit(
            r#"
name: com.example.Config
kind: interface
members:
  - name: label
    kind: property
    type: String
    mutable: true
"#,
            &EmitOptions { counters: true },
        );
        assert!(src.contains("val labelCallCount = AtomicInteger(0)"));
        assert!(src.contains("labelCallCount.incrementAndGet()"));
    }

    #[test]
    fn vararg_parameter_is_forwarded_as_array() {
        let src = emit(
            r#"
name: com.example.Logger
kind: interface
members:
  - name: log
    parameters:
      - name: parts
        type: String
        vararg: true
    returns: Unit
"#,
            &EmitOptions::default(),
        );
        assert!(src.contains("internal var logBehavior: (Array<out String>) -> Unit"));
        assert!(src.contains("override fun log(vararg parts: String) = logBehavior(parts)"));
    }
}
