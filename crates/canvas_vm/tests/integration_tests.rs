//! End-to-end pipeline tests: raw RGBA buffer → CodelGrid → Tokenizer →
//! Trace builder → Interpreter, with no external image fixtures — each
//! test builds its source pixels in-line.

use canvas_vm::{build_trace, codel_grid_from_rgba, Interpreter, ShapeTable, Stack};

const LIGHT_RED: [u8; 4] = [0xFF, 0xC0, 0xC0, 0xFF];
const LIGHT_YELLOW: [u8; 4] = [0xFF, 0xFF, 0xC0, 0xFF];
const DARK_RED: [u8; 4] = [0xC0, 0x00, 0x00, 0xFF];
const BLACK: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

fn strip(pixels: &[&[u8; 4]]) -> (usize, usize, Vec<u8>) {
    let mut rgba = Vec::with_capacity(pixels.len() * 4);
    for p in pixels {
        rgba.extend_from_slice(*p);
    }
    (pixels.len(), 1, rgba)
}

/// A 72-codel LightRed block (Push 72), one LightYellow codel
/// (LightRed -> LightYellow is hue+1/light+0 = Push), one DarkRed codel
/// (LightYellow -> DarkRed is hue+5/light+2 = CharOut), then Black. Prints
/// 'H' (72) and halts.
#[test]
fn pipeline_prints_a_single_character() {
    let mut pixels: Vec<&[u8; 4]> = vec![&LIGHT_RED; 72];
    pixels.push(&LIGHT_YELLOW);
    pixels.push(&DARK_RED);
    pixels.push(&BLACK);
    let (width, height, rgba) = strip(&pixels);

    let (w, h, colors) = codel_grid_from_rgba(width, height, &rgba, 1);
    let table = ShapeTable::tokenize(w, h, colors);
    let program = build_trace(&table, Stack::DEFAULT_CAPACITY).unwrap();
    assert!(program.ends_in_exit());

    let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
    interp.run().expect("program should run to completion");
    let output = interp.into_output();
    assert_eq!(String::from_utf8(output).unwrap(), "H\n");
}

/// Scenario A: a single chromatic codel boxed in by Black on every side
/// halts after exhausting all 8 (Dp, Cc) combinations.
#[test]
fn pipeline_halts_a_boxed_in_codel() {
    let pixels: Vec<&[u8; 4]> = vec![&LIGHT_RED, &BLACK, &BLACK, &BLACK];
    let mut rgba = Vec::new();
    for p in &pixels {
        rgba.extend_from_slice(*p);
    }

    let (w, h, colors) = codel_grid_from_rgba(2, 2, &rgba, 1);
    let table = ShapeTable::tokenize(w, h, colors);
    let program = build_trace(&table, Stack::DEFAULT_CAPACITY).unwrap();
    assert_eq!(program.len(), 17);

    let mut interp = Interpreter::new(program, Stack::DEFAULT_CAPACITY, "".as_bytes(), Vec::new());
    interp.run().expect("an all-retries program still reaches Exit");
    assert!(interp.stack().is_empty());
}

/// A program downscaled from a magnified source image (codel_size > 1)
/// traces and runs identically to its 1:1 counterpart.
#[test]
fn pipeline_honors_codel_size_downscaling() {
    const K: usize = 3;
    let logical = [&LIGHT_RED, &LIGHT_YELLOW, &BLACK];
    let (logical_w, logical_h) = (logical.len(), 1);

    let mut rgba = vec![0u8; logical_w * K * logical_h * K * 4];
    for (x, color) in logical.iter().enumerate() {
        for dx in 0..K {
            let px = x * K + dx;
            let idx = px * 4;
            rgba[idx..idx + 4].copy_from_slice(*color);
        }
    }

    let (w, h, colors) = codel_grid_from_rgba(logical_w * K, logical_h * K, &rgba, K);
    assert_eq!((w, h), (logical_w, logical_h));
    let table = ShapeTable::tokenize(w, h, colors);
    let program = build_trace(&table, Stack::DEFAULT_CAPACITY).unwrap();

    // LightRed (size 1) -> LightYellow is Push(1); boxed by Black next.
    assert_eq!(program.instructions[0], canvas_vm::Instruction::push(1));
}

/// A traced `Program` survives a JSON round trip unchanged, supporting
/// inspection/replay without re-tokenizing.
#[test]
fn program_round_trips_through_json() {
    let pixels: Vec<&[u8; 4]> = vec![&LIGHT_RED, &LIGHT_YELLOW, &BLACK];
    let mut rgba = Vec::new();
    for p in &pixels {
        rgba.extend_from_slice(*p);
    }
    let (w, h, colors) = codel_grid_from_rgba(3, 1, &rgba, 1);
    let table = ShapeTable::tokenize(w, h, colors);
    let program = build_trace(&table, Stack::DEFAULT_CAPACITY).unwrap();

    let json = serde_json::to_string(&program).unwrap();
    let restored: canvas_vm::Program = serde_json::from_str(&json).unwrap();
    assert_eq!(program.instructions, restored.instructions);
}
