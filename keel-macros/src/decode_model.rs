use convert_case::{Case, Casing};
use keel_core::Cast;
use syn::{ItemStruct, LitStr, Path, Result, meta::ParseNestedMeta, spanned::Spanned};

pub(crate) enum CastKind {
    /// One of the built in tags.
    Tag(Cast),
    /// Path of a type implementing `BackedEnum`.
    Enum(Path),
}

pub(crate) struct ModelMetadata {
    pub(crate) name: String,
    pub(crate) alias: String,
    pub(crate) primary_key: String,
    pub(crate) hooks: bool,
    pub(crate) casts: Vec<(String, CastKind)>,
}

fn decode_casts(meta: ParseNestedMeta, casts: &mut Vec<(String, CastKind)>) -> Result<()> {
    meta.parse_nested_meta(|entry| {
        let Some(attribute) = entry.path.get_ident().map(ToString::to_string) else {
            return Err(entry.error("expected an attribute name, like `cast(tags = array)`"));
        };
        let path: Path = entry.value()?.parse()?;
        let kind = match path.get_ident().and_then(|v| Cast::parse(&v.to_string())) {
            Some(cast) => CastKind::Tag(cast),
            None => CastKind::Enum(path),
        };
        if casts.iter().any(|(name, _)| *name == attribute) {
            return Err(entry.error(format!("attribute `{attribute}` has more than one cast")));
        }
        casts.push((attribute, kind));
        Ok(())
    })
}

pub(crate) fn decode_model(item: &ItemStruct) -> Result<ModelMetadata> {
    let mut name = item.ident.to_string().to_case(Case::Snake);
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut result = ModelMetadata {
        name,
        alias: String::new(),
        primary_key: "id".into(),
        hooks: false,
        casts: Vec::new(),
    };
    for attr in &item.attrs {
        if !attr.path().is_ident("keel") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = meta.value()?.parse::<LitStr>()?.value();
            } else if meta.path.is_ident("alias") {
                result.alias = meta.value()?.parse::<LitStr>()?.value();
            } else if meta.path.is_ident("primary_key") {
                result.primary_key = meta.value()?.parse::<LitStr>()?.value();
            } else if meta.path.is_ident("hooks") {
                result.hooks = true;
            } else if meta.path.is_ident("cast") {
                decode_casts(meta, &mut result.casts)?;
            } else {
                return Err(meta.error(
                    "unknown keel attribute, expected `name`, `alias`, `primary_key`, `hooks` or `cast`",
                ));
            }
            Ok(())
        })?;
    }
    if result.name.is_empty() {
        return Err(syn::Error::new(item.span(), "the table name cannot be empty"));
    }
    if result.primary_key.is_empty() {
        return Err(syn::Error::new(item.span(), "the primary key cannot be empty"));
    }
    Ok(result)
}
