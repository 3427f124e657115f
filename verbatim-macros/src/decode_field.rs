use syn::{Field, Ident, LitStr};

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) skip: bool,
}

pub(crate) fn decode_field(field: &Field) -> FieldMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Params can only be derived for structs with named fields");
    let mut name = ident.to_string();
    if let Some(v) = name.strip_prefix("r#") {
        name = v.to_string();
    }
    let mut skip = false;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("param_name") {
            let Ok(v) = meta.require_list().and_then(|v| v.parse_args::<LitStr>()) else {
                panic!(
                    "Error while parsing `param_name`, use it like #[param_name(\"{}\")]",
                    name
                );
            };
            name = v.value();
        } else if meta.path().is_ident("param_skip") {
            if meta.require_path_only().is_err() {
                panic!("Error while parsing `param_skip`, use it like #[param_skip]");
            }
            skip = true;
        }
    }
    FieldMetadata { ident, name, skip }
}
