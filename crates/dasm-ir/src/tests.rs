//! Tests for dasm-ir.

use crate::{
    CompileContext, CompileOptions, DataType, DataValue, ErrorKind, Level, OperandType, Span,
    broadcast_len, compile, compile_with, resolve, resolve_operands,
};
use serde_json::json;

const SAMPLE: &str = "\
# dd
@data
num t = 0.5
vec2 origin = (0, 0)
vec3[] colors = [(1,0,0), (0,1,0)]
num[] weights = [0.25, 0.75]
@functions
// helpers
lerp a b t
@program
mul r weights t
ret r
";

#[test]
fn test_compile_sample() {
    let module = compile(SAMPLE).unwrap();
    assert!(module.directives.dump_data);
    assert_eq!(module.data.singlets().len(), 2);
    assert_eq!(module.data.lists().len(), 2);
    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.functions[0].text, "lerp a b t");
    assert_eq!(module.program.len(), 2);
    assert_eq!(module.program[1].line, 12);
}

#[test]
fn test_data_tables_json() {
    let module = compile(SAMPLE).unwrap();
    let value = serde_json::to_value(&module.data).unwrap();
    assert_eq!(
        value,
        json!({
            "singlets": [
                { "name": "t", "value": 0.5 },
                { "name": "origin", "value": [0.0, 0.0] }
            ],
            "lists": [
                {
                    "name": "colors",
                    "element_type": "vec3",
                    "values": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
                },
                { "name": "weights", "element_type": "num", "values": [0.25, 0.75] }
            ]
        })
    );
}

#[test]
fn test_dump_directive_logs_values() {
    let mut ctx = CompileContext::new();
    compile_with(&mut ctx, SAMPLE).unwrap();

    let messages: Vec<&str> = ctx
        .diagnostics()
        .entries()
        .iter()
        .map(|d| d.message.as_str())
        .collect();
    assert!(messages.contains(&"Declared data (4 values):"));
    assert!(messages.contains(&"vec3[] colors = [(1,0,0),(0,1,0)]"));
    assert!(messages.last().unwrap().starts_with("Finished compiling DASM"));
}

#[test]
fn test_dump_option_without_directive() {
    let mut ctx = CompileContext::with_options(CompileOptions {
        dump_data: true,
        ..Default::default()
    });
    compile_with(&mut ctx, "@data\nnum a = 1\n").unwrap();
    assert!(
        ctx.diagnostics()
            .entries()
            .iter()
            .any(|d| d.message == "num a = 1")
    );
}

#[test]
fn test_failed_compile_logs_error() {
    let mut ctx = CompileContext::new();
    let err = compile_with(&mut ctx, "@data\nnum a = 1\nnum a = 2\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Redeclaration);
    assert_eq!(err.span(), Some(Span::new(3, 1)));

    let last_error = ctx
        .diagnostics()
        .entries()
        .iter()
        .rev()
        .find(|d| d.level == Level::Error)
        .unwrap();
    assert_eq!(last_error.message, err.to_string());
}

#[test]
fn test_template_misuse_in_data() {
    for source in ["@data\nany x = 1\n", "@data\nvecn x = 1\n", "@data\nany[] x = [1]\n"] {
        assert_eq!(
            compile(source).unwrap_err().kind(),
            ErrorKind::TemplateMisuse,
            "{source}"
        );
    }
}

#[test]
fn test_resolution_properties() {
    use DataType::*;

    assert_eq!(resolve("add", &[Num, Num]).unwrap(), Some(Num));
    assert_eq!(
        resolve("add", &[Vec2, Vec3]).unwrap_err().kind(),
        ErrorKind::TypeMismatch
    );
    assert_eq!(resolve("mul", &[Num, Vec2]).unwrap(), Some(Vec2));
    assert!(resolve("add", &[Num, Vec2]).is_err());
    assert_eq!(resolve("total", &[Vec3]).unwrap(), Some(Vec3));
    assert_eq!(resolve("count", &[Vec3]).unwrap(), Some(Num));
}

#[test]
fn test_declared_lists_drive_broadcast() {
    let module = compile(SAMPLE).unwrap();
    let weights = module.data.get("weights").unwrap();
    let t = module.data.get("t").unwrap();

    assert_eq!(
        resolve_operands("mul", &[weights.operand_type(), t.operand_type()]).unwrap(),
        Some(OperandType::List(DataType::Num))
    );

    let colors = module.data.list("colors").unwrap();
    assert_eq!(
        resolve_operands("total", &[OperandType::List(colors.element_type)]).unwrap(),
        Some(OperandType::Singlet(DataType::Vec3))
    );

    let weights_len = module.data.list("weights").map(|l| l.values.len());
    assert_eq!(broadcast_len("mul", &[weights_len, None]).unwrap(), Some(2));
    assert_eq!(
        broadcast_len("add", &[weights_len, Some(3)])
            .unwrap_err()
            .kind(),
        ErrorKind::Broadcast
    );
}

#[test]
fn test_vector_list_round_trip() {
    let module = compile("@data\nvec2[] p = [(1,2),(3,4)]\n").unwrap();
    let p = module.data.list("p").unwrap();
    assert_eq!(
        p.values,
        vec![DataValue::Vec2([1.0, 2.0]), DataValue::Vec2([3.0, 4.0])]
    );

    let again = compile(&format!("@data\nvec2[] p = {}\n", p.literal())).unwrap();
    assert_eq!(again.data.list("p").unwrap().values, p.values);
}
