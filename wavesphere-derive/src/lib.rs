//! Derive macros for wavesphere configuration types.
//!
//! This crate provides two derive macros:
//!
//! - [`ConfigOptions`] - Generates a name-keyed option table with clamping limits
//! - [`PresetName`] - Gives unit enums stable string names for lookup
//!
//! # Usage
//!
//! These macros are re-exported from the main `wavesphere` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use wavesphere::config::{ConfigOptions, PresetName};
//!
//! #[derive(ConfigOptions, Default)]
//! struct Knobs {
//!     #[option(min = 0.5, max = 5.0)]
//!     radius: f32,
//!     #[option(name = "autoRotate")]
//!     auto_rotate: bool,
//! }
//!
//! #[derive(PresetName, Clone, Copy, PartialEq)]
//! enum Mood {
//!     Calm,
//!     Energetic,
//! }
//! ```
//!
//! # The ConfigOptions Macro
//!
//! Every named field becomes an option. The option name defaults to the
//! camelCase form of the field name (`wave_speed` → `waveSpeed`), matching the
//! flat option objects embedders pass in.
//!
//! ## Supported Types
//!
//! | Rust Type | Option kind |
//! |-----------|-------------|
//! | `f32` | number, optionally clamped to `[min, max]` |
//! | `bool` | boolean |
//!
//! ## Field Attributes
//!
//! - `#[option(name = "...")]` - override the option name
//! - `#[option(min = 0.1, max = 2.0)]` - clamp limits (either bound may be omitted)
//! - `#[option(skip)]` - keep the field out of the option table
//!
//! # The PresetName Macro
//!
//! `#[derive(PresetName)]` gives a unit enum:
//! - `Enum::ALL` - every variant in declaration order
//! - `Enum::name(&self)` - snake_case variant name (or `#[preset(name = "...")]`)
//! - `Enum::from_name(&str)` - case-insensitive lookup
//! - `Display` printing the name

use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::parse::ParseStream;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Type};

/// Derive macro for flat, name-keyed configuration structs.
///
/// Implements `wavesphere::config::ConfigOptions` for the struct.
///
/// # Generated Items
///
/// For a struct `Knobs`:
///
/// - `Knobs::OPTIONS` - one `OptionSpec` per option, in field order
/// - `set_option(&mut self, key, value)` - applies and clamps a value, reporting
///   whether it was applied, clamped, unknown or of the wrong kind
/// - `get_option(&self, key)` - reads an option back by name
/// - `clamp_to_limits(&mut self)` - clamps every numeric field in place and
///   returns the names of the fields that moved
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to an enum or a tuple struct
/// - A non-skipped field is neither `f32` nor `bool`
/// - `min` is greater than `max` on the same field
#[proc_macro_derive(ConfigOptions, attributes(option))]
pub fn derive_config_options(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("ConfigOptions derive only supports structs with named fields"),
        },
        _ => panic!("ConfigOptions derive only supports structs"),
    };

    let mut specs = Vec::new();
    let mut set_arms = Vec::new();
    let mut get_arms = Vec::new();
    let mut clamp_stmts = Vec::new();

    for field in fields.iter() {
        let field_ident = field.ident.as_ref().expect("named field");
        let attrs = match parse_option_attrs(field) {
            Ok(attrs) => attrs,
            Err(err) => return err.to_compile_error().into(),
        };
        if attrs.skip {
            continue;
        }

        let option_name = attrs
            .name
            .unwrap_or_else(|| camel_case(&field_ident.to_string()));
        let kind = field_kind(&field.ty).unwrap_or_else(|| {
            panic!(
                "ConfigOptions field '{}' must be f32 or bool (or marked #[option(skip)])",
                field_ident
            )
        });

        if let (Some(min), Some(max)) = (attrs.min, attrs.max) {
            if min > max {
                panic!(
                    "ConfigOptions field '{}' has min ({}) greater than max ({})",
                    field_ident, min, max
                );
            }
        }

        let min_tokens = optional_limit(attrs.min);
        let max_tokens = optional_limit(attrs.max);

        match kind {
            FieldKind::Number => {
                specs.push(quote! {
                    wavesphere::config::OptionSpec {
                        name: #option_name,
                        kind: wavesphere::config::OptionKind::Number,
                        min: #min_tokens,
                        max: #max_tokens,
                    }
                });
                set_arms.push(quote! {
                    #option_name => match value {
                        wavesphere::config::OptionValue::Number(requested) => {
                            if !requested.is_finite() {
                                return wavesphere::config::OptionOutcome::TypeMismatch;
                            }
                            let applied = wavesphere::config::clamp_limits(requested, #min_tokens, #max_tokens);
                            self.#field_ident = applied;
                            if applied == requested {
                                wavesphere::config::OptionOutcome::Applied
                            } else {
                                wavesphere::config::OptionOutcome::Clamped { requested, applied }
                            }
                        }
                        _ => wavesphere::config::OptionOutcome::TypeMismatch,
                    }
                });
                get_arms.push(quote! {
                    #option_name => Some(wavesphere::config::OptionValue::Number(self.#field_ident))
                });
                clamp_stmts.push(quote! {
                    let clamped = wavesphere::config::clamp_limits(self.#field_ident, #min_tokens, #max_tokens);
                    if clamped != self.#field_ident {
                        self.#field_ident = clamped;
                        moved.push(#option_name);
                    }
                });
            }
            FieldKind::Bool => {
                specs.push(quote! {
                    wavesphere::config::OptionSpec {
                        name: #option_name,
                        kind: wavesphere::config::OptionKind::Bool,
                        min: None,
                        max: None,
                    }
                });
                set_arms.push(quote! {
                    #option_name => match value {
                        wavesphere::config::OptionValue::Bool(flag) => {
                            self.#field_ident = flag;
                            wavesphere::config::OptionOutcome::Applied
                        }
                        _ => wavesphere::config::OptionOutcome::TypeMismatch,
                    }
                });
                get_arms.push(quote! {
                    #option_name => Some(wavesphere::config::OptionValue::Bool(self.#field_ident))
                });
            }
        }
    }

    let expanded = quote! {
        impl wavesphere::config::ConfigOptions for #name {
            const OPTIONS: &'static [wavesphere::config::OptionSpec] = &[
                #(#specs),*
            ];

            fn set_option(
                &mut self,
                key: &str,
                value: wavesphere::config::OptionValue,
            ) -> wavesphere::config::OptionOutcome {
                match key {
                    #(#set_arms,)*
                    _ => wavesphere::config::OptionOutcome::Unknown,
                }
            }

            fn get_option(&self, key: &str) -> Option<wavesphere::config::OptionValue> {
                match key {
                    #(#get_arms,)*
                    _ => None,
                }
            }

            fn clamp_to_limits(&mut self) -> Vec<&'static str> {
                let mut moved: Vec<&'static str> = Vec::new();
                #(#clamp_stmts)*
                moved
            }
        }
    };

    TokenStream::from(expanded)
}

/// Derive macro for preset enums.
///
/// Variants are named by their snake_case identifier unless overridden with
/// `#[preset(name = "...")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(PresetName, Clone, Copy, PartialEq, Debug)]
/// enum SpherePreset {
///     Default,        // "default"
///     HighQuality,    // "high_quality"
///     #[preset(name = "still")]
///     Static,         // "still"
/// }
///
/// assert_eq!(SpherePreset::from_name("HIGH_QUALITY"), Some(SpherePreset::HighQuality));
/// ```
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to a struct instead of an enum
/// - Any variant has fields
/// - Enum has zero variants
#[proc_macro_derive(PresetName, attributes(preset))]
pub fn derive_preset_name(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => panic!("PresetName derive only supports enums"),
    };
    if variants.is_empty() {
        panic!("PresetName enum must have at least one variant");
    }

    let mut idents = Vec::new();
    let mut names = Vec::new();
    for variant in variants.iter() {
        if !matches!(variant.fields, Fields::Unit) {
            panic!(
                "PresetName enum variants must be unit variants. Found fields on variant '{}'",
                variant.ident
            );
        }

        let mut custom = None;
        for attr in &variant.attrs {
            if !attr.path().is_ident("preset") {
                continue;
            }
            let parsed = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    custom = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported preset attribute, expected `name`"))
                }
            });
            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }

        idents.push(variant.ident.clone());
        names.push(custom.unwrap_or_else(|| snake_case(&variant.ident.to_string())));
    }

    let name_arms = idents.iter().zip(names.iter()).map(|(ident, preset_name)| {
        quote! { #name::#ident => #preset_name }
    });
    let lookup_arms = idents.iter().zip(names.iter()).map(|(ident, preset_name)| {
        quote! {
            if name.eq_ignore_ascii_case(#preset_name) {
                return Some(#name::#ident);
            }
        }
    });

    let expanded = quote! {
        impl #name {
            /// Every preset, in declaration order.
            pub const ALL: &'static [#name] = &[#(#name::#idents),*];

            /// Stable lookup name of this preset.
            pub fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            /// Find a preset by name, ignoring ASCII case.
            pub fn from_name(name: &str) -> Option<#name> {
                #(#lookup_arms)*
                None
            }
        }

        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };

    TokenStream::from(expanded)
}

enum FieldKind {
    Number,
    Bool,
}

#[derive(Default)]
struct OptionAttrs {
    name: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
    skip: bool,
}

fn parse_option_attrs(field: &syn::Field) -> syn::Result<OptionAttrs> {
    let mut attrs = OptionAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("option") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.name = Some(lit.value());
            } else if meta.path.is_ident("min") {
                attrs.min = Some(parse_limit(meta.value()?)?);
            } else if meta.path.is_ident("max") {
                attrs.max = Some(parse_limit(meta.value()?)?);
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
            } else {
                return Err(meta.error("unsupported option attribute, expected name/min/max/skip"));
            }
            Ok(())
        })?;
    }
    Ok(attrs)
}

fn parse_limit(input: ParseStream) -> syn::Result<f64> {
    let negative = input.peek(syn::Token![-]);
    if negative {
        input.parse::<syn::Token![-]>()?;
    }
    let lit: Lit = input.parse()?;
    let value = match &lit {
        Lit::Float(f) => f.base10_parse::<f64>()?,
        Lit::Int(i) => i.base10_parse::<f64>()?,
        other => return Err(syn::Error::new(other.span(), "expected a numeric limit")),
    };
    Ok(if negative { -value } else { value })
}

fn field_kind(ty: &Type) -> Option<FieldKind> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    match segment.ident.to_string().as_str() {
        "f32" => Some(FieldKind::Number),
        "bool" => Some(FieldKind::Bool),
        _ => None,
    }
}

fn optional_limit(limit: Option<f64>) -> proc_macro2::TokenStream {
    match limit {
        Some(value) => {
            let lit = Literal::f32_suffixed(value.abs() as f32);
            if value < 0.0 {
                quote! { Some(-#lit) }
            } else {
                quote! { Some(#lit) }
            }
        }
        None => quote! { None },
    }
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

fn snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for (i, ch) in camel.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
