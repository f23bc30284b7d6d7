//! `jade sig`: decode a JVM generic signature.

use std::io::Write;

use jade_signature::{parse_class_signature, try_parse_signature, GenType, Wildcard};

use crate::CliError;

/// Decode `signature` and print its Java form followed by its structure.
///
/// Signatures starting with `<` are read as class signatures.
pub fn describe_signature(signature: &str, out: &mut dyn Write) -> Result<(), CliError> {
    if signature.starts_with('<') {
        let class = parse_class_signature(signature, None)?;
        for param in &class.params {
            writeln!(out, "type parameter {param}")?;
        }
        for supertype in &class.supertypes {
            writeln!(out, "supertype {supertype}")?;
            write_outline(out, &GenType::Class(supertype.clone()), 1)?;
        }
        return Ok(());
    }

    let ty = try_parse_signature(signature, None, None)?;
    writeln!(out, "{ty}")?;
    write_outline(out, &ty, 1)
}

fn write_outline(out: &mut dyn Write, ty: &GenType, depth: usize) -> Result<(), CliError> {
    let indent = "  ".repeat(depth);
    match ty {
        GenType::Primitive(kind) => writeln!(out, "{indent}primitive {kind}")?,
        GenType::Array(element) => {
            writeln!(out, "{indent}array")?;
            write_outline(out, element, depth + 1)?;
        }
        GenType::Class(class) => {
            writeln!(out, "{indent}class {}", class.name())?;
            if let Some(outer) = &class.outer {
                writeln!(out, "{indent}  outer")?;
                write_outline(out, &GenType::Class((**outer).clone()), depth + 2)?;
            }
            for arg in class.args.iter().flatten() {
                write_outline(out, arg, depth + 1)?;
            }
        }
        GenType::TypeParam(name) => writeln!(out, "{indent}type parameter {name}")?,
        GenType::Wildcard(Wildcard::Unbounded) => writeln!(out, "{indent}wildcard")?,
        GenType::Wildcard(Wildcard::Extends(bound)) => {
            writeln!(out, "{indent}wildcard extends")?;
            write_outline(out, bound, depth + 1)?;
        }
        GenType::Wildcard(Wildcard::Super(bound)) => {
            writeln!(out, "{indent}wildcard super")?;
            write_outline(out, bound, depth + 1)?;
        }
    }
    Ok(())
}
