//! Placeholder component source emitter.

use crate::rows::{SkeletonBox, SkeletonPlan};

const HEADER: &str = "import { Skeleton } from \"~/components/ui/skeleton\";\n\nexport default function LoadingSkeleton() {\n  return (\n";
const FOOTER: &str = "  );\n}";

/// Emitted when no leaves were detected.
pub const EMPTY_SKELETON: &str = "import { Skeleton } from \"~/components/ui/skeleton\";\n\nexport default function LoadingSkeleton() {\n  return (\n    <div className=\"p-4\">\n      <p className=\"text-muted-foreground\">No elements detected</p>\n    </div>\n  );\n}";

fn skeleton_tag(b: &SkeletonBox) -> String {
    format!("<Skeleton className=\"{}\" />", b.class_list())
}

/// Render `plan` as a component module: one `<Skeleton>` per box, rows of
/// several boxes wrapped in a horizontal flex container.
pub fn emit_code(plan: &SkeletonPlan) -> String {
    if plan.is_empty() {
        return EMPTY_SKELETON.to_string();
    }

    let body = plan
        .rows
        .iter()
        .map(|row| {
            if row.is_flow() {
                let inner = row
                    .boxes
                    .iter()
                    .map(skeleton_tag)
                    .collect::<Vec<_>>()
                    .join("\n        ");
                format!("      <div className=\"flex items-center gap-4\">\n        {}\n      </div>", inner)
            } else {
                format!("      {}", skeleton_tag(&row.boxes[0]))
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}    <div className=\"flex flex-col gap-4 p-4\">\n{}\n    </div>\n{}",
        HEADER, body, FOOTER
    )
}
