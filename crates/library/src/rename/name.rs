use crate::View;
use crate::range::Taxon;
use dmread_extract::Identifier;

/// Everything in the new name before the view suffix: the identifier, then
/// the taxon when the image was matched against a range table.
pub(crate) fn base_name(identifier: &Identifier, taxon: Option<&Taxon>) -> String {
    let mut base = identifier.base_name();
    if let Some(taxon) = taxon {
        base.push_str(&taxon.name_suffix());
    }
    base
}

/// `<base><suffix>.<extension>`, with the extension kept exactly as given.
pub(crate) fn compose(base: &str, view: View, extension: Option<&str>) -> String {
    match extension {
        Some(extension) => format!("{base}{view}.{extension}"),
        None => format!("{base}{view}"),
    }
}
