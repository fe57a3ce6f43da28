use std::collections::{HashMap, HashSet};

use rampart_config::{DependencyEdge, DottedPath};

use crate::commands::load_project;
use crate::flags::{Args, SyncArgs};

/// `rampart sync [--add]`: bring every module's declared `depends_on` list
/// in line with what it's actually observed to import -- the inverse of
/// `--exact`. Without `--add`, only removes
/// declared edges nothing imports; with `--add`, also appends observed
/// edges that weren't declared. A module with `depends_on = None`
/// ("unchecked -- allow anything") is left untouched either way, since it
/// has no list to reconcile. Running `sync` twice in a row is a no-op the
/// second time.
pub fn run(args: &Args, sync: &SyncArgs) -> anyhow::Result<i32> {
    let config_path = args
        .config_path
        .clone()
        .unwrap_or_else(|| args.project_dir.join(rampart_config::DEFAULT_CONFIG_FILE_NAME));
    let mut project = load_project(&args.project_dir, args.config_path.as_deref())?;
    rampart_check::validate_project_dir(&args.project_dir)?;

    let observed = observed_dependencies(&project, &args.project_dir);

    let mut added = 0usize;
    let mut removed = 0usize;

    for module in project.modules.iter_mut() {
        if module.is_root() {
            continue;
        }
        let Some(existing) = module.depends_on.take() else { continue };
        let used = observed.get(&module.path).cloned().unwrap_or_default();

        let mut kept = Vec::new();
        for edge in existing {
            if used.contains(edge.path()) {
                kept.push(edge);
            } else {
                removed += 1;
            }
        }

        if sync.add {
            let declared: HashSet<DottedPath> = kept.iter().map(|e| e.path().clone()).collect();
            let mut extra: Vec<DottedPath> =
                used.iter().filter(|dep| !declared.contains(dep)).cloned().collect();
            extra.sort_by_key(DottedPath::to_string);
            for dep in extra {
                kept.push(DependencyEdge::Bare(dep));
                added += 1;
            }
        }

        kept.sort_by_key(|edge| edge.path().to_string());
        module.depends_on = Some(kept);
    }

    let text = rampart_config::to_toml_string(&project)?;
    std::fs::write(&config_path, text)?;

    println!("sync: {added} dependency edge(s) added, {removed} removed");
    Ok(0)
}

/// Every non-root module's observed internal dependencies, computed once up
/// front so `sync` doesn't re-walk the source tree once per module.
fn observed_dependencies(
    project: &rampart_config::ProjectConfig,
    project_dir: &std::path::Path,
) -> HashMap<DottedPath, HashSet<DottedPath>> {
    let mut map = HashMap::new();
    for module in &project.modules {
        if module.is_root() {
            continue;
        }
        let report = rampart_check::report(project, project_dir, &module.path);
        map.insert(module.path.clone(), report.dependencies.into_iter().collect());
    }
    map
}
