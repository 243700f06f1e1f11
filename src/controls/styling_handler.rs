/*
 * Color helpers shared by the custom painters: conversion to the native
 * BGR color layout, the derived hot/pressed/disabled variants, and the
 * resolution of per-control overrides against the theme.
 */

use crate::controls::ControlKind;
use crate::descriptor::ControlSnapshot;
use crate::styling_primitives::{Color, Theme};

/*
 * Packs a `Color` into the native COLORREF layout. The windowing system
 * expects colors in BGR order.
 */
pub(crate) fn color_to_colorref(color: Color) -> u32 {
    (color.r as u32) | ((color.g as u32) << 8) | ((color.b as u32) << 16)
}

pub(crate) fn colorref_to_color(colorref: u32) -> Color {
    Color {
        r: (colorref & 0xFF) as u8,
        g: ((colorref >> 8) & 0xFF) as u8,
        b: ((colorref >> 16) & 0xFF) as u8,
    }
}

/// Moves each channel `percent` of the way towards white.
pub(crate) fn lighten(color: Color, percent: u32) -> Color {
    blend(color, Color::rgb(255, 255, 255), percent)
}

/// Scales each channel down by `percent`.
pub(crate) fn darken(color: Color, percent: u32) -> Color {
    let keep = 100 - percent.min(100);
    Color {
        r: (color.r as u32 * keep / 100) as u8,
        g: (color.g as u32 * keep / 100) as u8,
        b: (color.b as u32 * keep / 100) as u8,
    }
}

/// Linear mix: `percent` of `towards`, the rest of `color`.
pub(crate) fn blend(color: Color, towards: Color, percent: u32) -> Color {
    let percent = percent.min(100);
    let mix = |a: u8, b: u8| -> u8 { ((a as u32 * (100 - percent) + b as u32 * percent) / 100) as u8 };
    Color {
        r: mix(color.r, towards.r),
        g: mix(color.g, towards.g),
        b: mix(color.b, towards.b),
    }
}

/// Interaction state a button face is painted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ButtonState {
    pub hot: bool,
    pub pressed: bool,
    pub disabled: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ButtonPalette {
    pub fill: Color,
    pub border: Color,
    pub text: Color,
}

/*
 * Resolves the colors for a button face. Theme overrides win; otherwise hot is
 * 15% lighter, pressed 20% darker and disabled halfway to the background.
 * Disabled wins over pressed, which wins over hot.
 */
pub(crate) fn button_palette(theme: &Theme, base: Color, text: Color, state: ButtonState) -> ButtonPalette {
    let border = if state.focused {
        theme.accent
    } else {
        theme.button_border
    };
    if state.disabled {
        let fill = theme
            .button_disabled
            .unwrap_or_else(|| blend(base, theme.background, 50));
        return ButtonPalette {
            fill,
            border: blend(theme.button_border, theme.background, 50),
            text: blend(text, theme.background, 50),
        };
    }
    let fill = if state.pressed {
        theme.button_pressed.unwrap_or_else(|| darken(base, 20))
    } else if state.hot {
        theme.button_hot.unwrap_or_else(|| lighten(base, 15))
    } else {
        base
    };
    ButtonPalette { fill, border, text }
}

/*
 * Text and background for a control: explicit style overrides first, then the
 * theme slot appropriate for the kind (input fields sit on the input
 * background, everything else on the window background).
 */
pub(crate) fn effective_colors(control: &ControlSnapshot, theme: &Theme, kind: ControlKind) -> (Color, Color) {
    let default_background = match kind {
        ControlKind::Edit { .. }
        | ControlKind::ComboBox
        | ControlKind::ListView
        | ControlKind::RichEdit
        | ControlKind::DateTime => theme.input_background,
        ControlKind::Button => theme.button_face,
        _ => theme.background,
    };
    let default_text = match kind {
        ControlKind::Button => theme.button_text,
        _ => theme.text,
    };
    (
        control.style.text_color.unwrap_or(default_text),
        control.style.background_color.unwrap_or(default_background),
    )
}
