//! Runs the active plugin table over a document.

use tracing::debug;

use crate::ast::Document;
use crate::plugins::builtin::{ActivePlugin, Builtin};
use crate::plugins::cleanup::*;
use crate::plugins::list_of_values::{CanonicalizationParams, cleanup_list_of_values};

/// Apply each plugin once, in table order.
pub fn optimize(doc: &mut Document, plugins: &[ActivePlugin]) {
    for active in plugins {
        debug!(plugin = active.plugin.name(), "running plugin");

        match active.plugin {
            Builtin::RemoveDoctype => remove_doctype(doc),
            Builtin::RemoveXmlProcInst => remove_xml_proc_inst(doc),
            Builtin::RemoveComments => remove_comments(&mut doc.root),
            Builtin::RemoveMetadata => remove_metadata(&mut doc.root),
            Builtin::RemoveEditorsNsData => remove_editors_ns_data(&mut doc.root),
            Builtin::ConvertColors => convert_colors(&mut doc.root),
            Builtin::CleanupListOfValues => {
                let params = CanonicalizationParams::from_params(&active.params);
                doc.for_each_element_mut(|elem| cleanup_list_of_values(elem, &params));
            }
        }
    }
}
