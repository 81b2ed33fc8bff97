//! Configuration builder and factory function.
//!
//! Entry points mirror the real member signatures, so callers write
//! behaviors against the declared generic types; storing casts up to
//! the erased slot type where the resolver demands it. The factory
//! returns the original declaration type, never the synthetic one.

use crate::generics::GenericResolution;
use crate::model::{Member, TypeDeclaration};

use super::{
    capitalize, closure_type, configuration_name, factory_name, fake_name,
    type_argument_list, type_parameter_clause,
};

pub(crate) fn emit_configuration(
    decl: &TypeDeclaration,
    resolution: &GenericResolution,
    out: &mut String,
) {
    let clause = type_parameter_clause(&decl.generics);
    let type_args = type_argument_list(&decl.generics);
    out.push_str(&format!(
        "class {}{}(private val fake: {}{type_args}){} {{\n",
        configuration_name(decl),
        clause.inline,
        fake_name(decl),
        clause.where_clause
    ));

    let mut first = true;
    for member in &decl.members {
        if !first {
            out.push('\n');
        }
        first = false;
        if member.is_function() {
            emit_function_entry(member, resolution, out);
        } else {
            emit_property_entries(member, resolution, out);
        }
    }

    out.push_str("}\n");
}

fn emit_function_entry(member: &Member, resolution: &GenericResolution, out: &mut String) {
    let name = &member.name;
    let accepted = closure_type(member, resolution, false);
    let clause = type_parameter_clause(&member.generics);
    let generics = if clause.inline.is_empty() {
        String::new()
    } else {
        format!("{} ", clause.inline)
    };

    if resolution.member_requires_cast(member) {
        out.push_str("    @Suppress(\"UNCHECKED_CAST\")\n");
    }
    out.push_str(&format!(
        "    fun {generics}{name}(behavior: {accepted}){} {{\n",
        clause.where_clause
    ));
    if resolution.member_requires_cast(member) {
        let stored = closure_type(member, resolution, true);
        out.push_str(&format!("        fake.{name}Behavior = behavior as {stored}\n"));
    } else {
        out.push_str(&format!("        fake.{name}Behavior = behavior\n"));
    }
    out.push_str("    }\n");
}

fn emit_property_entries(member: &Member, resolution: &GenericResolution, out: &mut String) {
    let name = &member.name;
    let ty = resolution
        .storage_type(Some(name.as_str()), &member.return_type)
        .render();

    out.push_str(&format!("    fun {name}(getter: () -> {ty}) {{\n"));
    out.push_str(&format!("        fake.{name}Getter = getter\n"));
    out.push_str("    }\n");

    if member.mutable {
        out.push('\n');
        out.push_str(&format!(
            "    fun set{}(setter: ({ty}) -> Unit) {{\n",
            capitalize(name)
        ));
        out.push_str(&format!("        fake.{name}Setter = setter\n"));
        out.push_str("    }\n");
    }
}

pub(crate) fn emit_factory(decl: &TypeDeclaration, out: &mut String) {
    let clause = type_parameter_clause(&decl.generics);
    let type_args = type_argument_list(&decl.generics);
    let generics = if clause.inline.is_empty() {
        String::new()
    } else {
        format!("{} ", clause.inline)
    };
    let configuration = configuration_name(decl);

    out.push_str(&format!(
        "fun {generics}{}(configure: {configuration}{type_args}.() -> Unit = {{}}): {}{type_args}{} {{\n",
        factory_name(decl),
        decl.simple_name(),
        clause.where_clause
    ));
    out.push_str(&format!(
        "    val fake = {}{type_args}()\n",
        fake_name(decl)
    ));
    out.push_str(&format!("    {configuration}(fake).configure()\n"));
    out.push_str("    return fake\n");
    out.push_str("}\n");
}

#[cfg(test)]
mod tests {
    use super::super::{emit_artifact, EmitOptions};
    use crate::defaults::DefaultValueMapper;
    use crate::generics::resolve;
    use crate::model::{analyze, parse_declaration_str};

    fn emit(yaml: &str) -> String {
        let mapper = DefaultValueMapper::new();
        let raw = parse_declaration_str(yaml).unwrap();
        let decl = analyze(&raw, &mapper).unwrap();
        let resolution = resolve(&decl);
        emit_artifact(&decl, &resolution, &mapper, &EmitOptions::default()).source
    }

    #[test]
    fn property_entries_come_in_pairs_for_var() {
        let src = emit(
            r#"
name: com.example.Config
kind: interface
members:
  - name: label
    kind: property
    type: String
    mutable: true
  - name: limit
    kind: property
    type: Int
"#,
        );
        assert!(src.contains("fun label(getter: () -> String) {"));
        assert!(src.contains("fake.labelGetter = getter"));
        assert!(src.contains("fun setLabel(setter: (String) -> Unit) {"));
        assert!(src.contains("fake.labelSetter = setter"));
        assert!(src.contains("fun limit(getter: () -> Int) {"));
        assert!(!src.contains("fun setLimit"));
    }

    #[test]
    fn factory_without_generics_takes_no_type_arguments() {
        let src = emit(
            r#"
name: com.example.Greeter
kind: interface
members:
  - name: greet
    returns: String
"#,
        );
        assert!(src.contains(
            "fun fakeGreeter(configure: FakeGreeterConfiguration.() -> Unit = {}): Greeter {"
        ));
        assert!(src.contains("val fake = FakeGreeter()"));
    }

    #[test]
    fn factory_carries_multi_bound_where_clause() {
        let src = emit(
            r#"
name: com.example.Sorter
kind: interface
generics:
  - name: T
    bounds: ["com.example.A", "com.example.B"]
members:
  - name: sort
    parameters:
      - name: value
        type: T
    returns: T
"#,
        );
        assert!(src.contains(
            "fun <T> fakeSorter(configure: FakeSorterConfiguration<T>.() -> Unit = {}): Sorter<T> where T : com.example.A, T : com.example.B {"
        ));
    }

    #[test]
    fn suspend_entry_accepts_suspend_closure() {
        let src = emit(
            r#"
name: com.example.Fetcher
kind: interface
members:
  - name: fetch
    suspend: true
    returns: String
"#,
        );
        assert!(src.contains("fun fetch(behavior: suspend () -> String) {"));
    }
}
