//! Step executor - runs one leaf step against the project directory

use crate::{
    core::{
        step::{CopyRule, FileMapping, Step, StepKind},
        BuildContext, ConfigError, StepError,
    },
    tools::{
        clean, concat, copy, files, inject, manifest, replace, sources, templates, upload, wrap,
        Toolchain,
    },
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn render_all(ctx: &BuildContext, values: &[String]) -> Result<Vec<String>, ConfigError> {
    values.iter().map(|v| ctx.render(v)).collect()
}

fn render_opt(ctx: &BuildContext, value: Option<&String>) -> Result<Option<String>, ConfigError> {
    value.map(|v| ctx.render(v)).transpose()
}

/// `relative` with its extension replaced by `ext` (which includes the dot)
fn with_extension(relative: &str, ext: &str) -> String {
    let file_start = relative.rfind('/').map(|p| p + 1).unwrap_or(0);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => format!("{}{}", &relative[..file_start + dot], ext),
        _ => format!("{}{}", relative, ext),
    }
}

/// Executes a single step
pub struct StepExecutor<T> {
    toolchain: T,
}

impl<T: Toolchain> StepExecutor<T> {
    pub fn new(toolchain: T) -> Self {
        Self { toolchain }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Run `step` below `root` and return the files it wrote
    pub async fn execute(
        &self,
        root: &Path,
        step: &Step,
        ctx: &BuildContext,
    ) -> Result<Vec<PathBuf>, StepError> {
        info!("Executing step: {} ({})", step.name, step.kind.label());

        match &step.kind {
            StepKind::TemplateCompile(t) => {
                let src = render_all(ctx, &t.src)?;
                let base = render_opt(ctx, t.base.as_ref())?;
                let matched = sources::resolve(root, &src, None, None)?;

                let mut entries = Vec::with_capacity(matched.len());
                for source in &matched {
                    let url = match &base {
                        Some(base) => source
                            .root_relative
                            .strip_prefix(base.as_str())
                            .unwrap_or(&source.root_relative),
                        None => &source.root_relative,
                    };
                    entries.push(templates::Template {
                        url: url.to_string(),
                        html: files::read_text(&source.path)?,
                    });
                }

                let dest = root.join(ctx.render(&t.dest)?);
                files::write_text(&dest, &templates::render(&t.module, &entries))?;
                debug!("Inlined {} template(s)", entries.len());
                Ok(vec![dest])
            }

            StepKind::StyleCompile(s) => {
                let src = render_all(ctx, &s.src)?;
                let cwd = render_opt(ctx, s.cwd.as_ref())?;
                let dest = root.join(ctx.render(&s.dest)?);

                let mut written = Vec::new();
                for source in sources::resolve(root, &src, cwd.as_deref(), s.filter)? {
                    let css = self.toolchain.compile_style(&source.path).await?;
                    let out = dest.join(with_extension(&source.relative, &s.ext));
                    files::write_text(&out, &css)?;
                    written.push(out);
                }
                Ok(written)
            }

            StepKind::Lint(l) => {
                let src = render_all(ctx, &l.src)?;
                let paths: Vec<PathBuf> = sources::resolve(root, &src, None, l.filter)?
                    .into_iter()
                    .map(|s| s.path)
                    .collect();

                let diagnostics: Vec<_> = self
                    .toolchain
                    .lint(&paths)
                    .await?
                    .into_iter()
                    .map(|mut d| {
                        if let Ok(relative) = d.file.strip_prefix(root) {
                            d.file = relative.to_path_buf();
                        }
                        d
                    })
                    .collect();

                if diagnostics.is_empty() {
                    debug!("{} file(s) lint free", paths.len());
                    Ok(Vec::new())
                } else if l.force {
                    for d in &diagnostics {
                        warn!("{}", d);
                    }
                    Ok(Vec::new())
                } else {
                    Err(StepError::Lint(diagnostics))
                }
            }

            StepKind::NamespaceWrap(w) => {
                let src = render_all(ctx, &w.src)?;
                let cwd = render_opt(ctx, w.cwd.as_ref())?;
                let dest = root.join(ctx.render(&w.dest)?);

                let mut written = Vec::new();
                for source in sources::resolve(root, &src, cwd.as_deref(), w.filter)? {
                    let vars = HashMap::from([
                        ("file".to_string(), source.relative.clone()),
                        ("module".to_string(), wrap::module_id(&source.relative).to_string()),
                    ]);
                    let before = ctx.render_with(&w.before, &vars)?;
                    let after = ctx.render_with(&w.after, &vars)?;

                    let content = files::read_text(&source.path)?;
                    let out = dest.join(&source.relative);
                    files::write_text(&out, &wrap::namespace(&before, &content, &after))?;
                    written.push(out);
                }
                Ok(written)
            }

            StepKind::ModuleWrap(m) => {
                let src = render_all(ctx, &m.src)?;
                let cwd = render_opt(ctx, m.cwd.as_ref())?;
                let dest = root.join(ctx.render(&m.dest)?);

                let mut written = Vec::new();
                for source in sources::resolve(root, &src, cwd.as_deref(), m.filter)? {
                    let content = files::read_text(&source.path)?;
                    let out = dest.join(&source.relative);
                    files::write_text(&out, &wrap::commonjs(&source.relative, &content))?;
                    written.push(out);
                }
                Ok(written)
            }

            StepKind::ReferenceInject(r) => {
                let page_path = root.join(ctx.render(&r.src)?);
                let page = files::read_text(&page_path)?;

                let scripts = match &r.js_files {
                    Some(pattern) => {
                        let base = render_opt(ctx, r.js_base_dir.as_ref())?;
                        let pattern = vec![ctx.render(pattern)?];
                        let append = ctx.render(&r.append_path)?;
                        let matched = sources::resolve(root, &pattern, base.as_deref(), None)?;
                        Some(
                            matched
                                .iter()
                                .map(|s| format!("{}{}", append, s.relative))
                                .collect::<Vec<_>>(),
                        )
                    }
                    None => None,
                };

                let html = inject::inject(&page, scripts.as_deref())
                    .map_err(|message| StepError::transform(&page_path, message))?;
                let dest = root.join(ctx.render(&r.dest)?);
                files::write_text(&dest, &html)?;
                Ok(vec![dest])
            }

            StepKind::Concatenate(c) => {
                let src = render_all(ctx, &c.src)?;
                let matched = if c.allow_empty {
                    sources::collect(root, &src, None, None)?
                } else {
                    sources::resolve(root, &src, None, None)?
                };
                let mut parts = Vec::new();
                for source in matched {
                    let content = files::read_text(&source.path)?;
                    parts.push(if c.strip_banners {
                        concat::strip_banner(&content).to_string()
                    } else {
                        content
                    });
                }

                let banner = if c.banner { ctx.banner() } else { "" };
                let dest = root.join(ctx.render(&c.dest)?);
                files::write_text(&dest, &concat::join(banner, &parts, &c.separator))?;
                debug!("Concatenated {} file(s) into {}", parts.len(), dest.display());
                Ok(vec![dest])
            }

            StepKind::Minify(m) => {
                let mut written = Vec::new();
                for FileMapping { dest, src } in &m.files {
                    let src = ctx.render(src)?;
                    let input = root.join(&src);
                    if !input.is_file() {
                        return Err(StepError::NoSources {
                            patterns: vec![src],
                        });
                    }

                    let minified = self.toolchain.minify(m.language, &input).await?;
                    let banner = if m.banner { ctx.banner() } else { "" };
                    let out = root.join(ctx.render(dest)?);
                    files::write_text(&out, &format!("{}{}", banner, minified))?;
                    written.push(out);
                }
                Ok(written)
            }

            StepKind::Copy(c) => {
                let mut written = Vec::new();
                for rule in &c.files {
                    let rendered = CopyRule {
                        src: render_all(ctx, &rule.src)?,
                        dest: ctx.render(&rule.dest)?,
                        cwd: render_opt(ctx, rule.cwd.as_ref())?,
                        ..rule.clone()
                    };
                    written.extend(copy::apply(root, &rendered)?);
                }
                Ok(written)
            }

            StepKind::ManifestGenerate(m) => {
                let src = render_all(ctx, &m.src)?;
                let base_path = ctx.render(&m.base_path)?;
                let entries: Vec<String> = sources::resolve(root, &src, Some(&base_path), None)?
                    .into_iter()
                    .map(|s| s.relative)
                    .filter(|relative| !manifest::is_excluded(relative, &m.exclude))
                    .collect();

                let time = m.timestamp.then_some(ctx.built_at);
                let dest = root.join(ctx.render(&m.dest)?);
                files::write_text(&dest, &manifest::render(&entries, &m.network, time))?;
                debug!("Manifest lists {} file(s)", entries.len());
                Ok(vec![dest])
            }

            StepKind::VariableSubstitute(v) => {
                let src = root.join(ctx.render(&v.src)?);
                let content = files::read_text(&src)?;

                let mut variables = v.variables.clone();
                for value in variables.values_mut() {
                    *value = ctx.render(value)?;
                }

                let replaced = replace::substitute(&content, &v.prefix, &variables)
                    .map_err(|e| StepError::transform(&src, e.to_string()))?;
                let dest = root.join(ctx.render(&v.dest)?);
                files::write_text(&dest, &replaced)?;
                Ok(vec![dest])
            }

            StepKind::RemoteUpload(u) => {
                let mut rendered = u.clone();
                rendered.bucket = ctx.render(&u.bucket)?;
                let requests = upload::plan(root, &rendered)?;
                info!("Uploading {} file(s) to {}", requests.len(), rendered.bucket);

                let mut uploaded = Vec::with_capacity(requests.len());
                for request in &requests {
                    self.toolchain.upload(request).await?;
                    uploaded.push(request.file.clone());
                }
                Ok(uploaded)
            }

            StepKind::Clean(c) => {
                let paths = render_all(ctx, &c.paths)?;
                clean::remove(root, &paths)
            }

            StepKind::Notify(n) => {
                let message = ctx.render(&n.message)?;
                self.toolchain.notify(&message).await?;
                Ok(Vec::new())
            }
        }
    }
}
