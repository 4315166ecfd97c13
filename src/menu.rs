//! Interactive menu
//!
//! The primary surface of the tool: a hierarchical prompt-driven menu
//! covering renaming, caption burn-in, metadata export/import, and
//! library restructuring. Invalid input re-prompts; every per-file
//! failure prints a line naming the file and the cause.

use crate::classify::{self, GapDecision};
use crate::config::{CategoryFilter, Config};
use crate::date::{self, ResolveRequest};
use crate::media::{self, MediaFile};
use crate::metadata::{transfer, MediaMetadataReader, MetadataProvider};
use crate::os::normalize_input_path;
use crate::overlay;
use crate::rename;
use crate::restructure::{self, TransferMode};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Interactive session over one loaded configuration
pub struct Menu {
    config: Config,
}

impl Menu {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Display welcome banner
    fn show_banner(&self) {
        let banner = r#"
╔══════════════════════════════════════════════╗
║                                              ║
║                 ARCHIVIST                    ║
║                                              ║
║     Personal photo & video archival tool     ║
║                                              ║
╚══════════════════════════════════════════════╝
"#;
        println!("{}", style(banner).cyan());
    }

    /// Run the main menu loop until the user exits.
    pub fn run(&self) -> anyhow::Result<()> {
        self.show_banner();

        loop {
            let options = vec![
                "Rename photographs to canonical names",
                "Burn captions into photos or videos",
                "Export metadata (CSV/JSON)",
                "Import metadata from file",
                "Restructure library into decade/year folders",
                "Exit",
            ];

            let selection = Select::new()
                .with_prompt("Select an operation")
                .items(&options)
                .default(0)
                .interact()?;

            let outcome = match selection {
                0 => self.rename_menu(),
                1 => self.burn_in_menu(),
                2 => self.export_metadata(),
                3 => self.import_metadata(),
                4 => self.restructure(),
                _ => {
                    println!("{}", style("Goodbye.").yellow());
                    return Ok(());
                }
            };

            if let Err(e) = outcome {
                println!("{} {}", style("✗").red().bold(), style(e).red());
            }
            println!();
        }
    }

    // ---- prompts -------------------------------------------------------

    fn prompt_directory(&self, prompt: &str) -> anyhow::Result<PathBuf> {
        let input: String = Input::new()
            .with_prompt(prompt)
            .validate_with(|raw: &String| -> Result<(), String> {
                let normalized = normalize_input_path(raw);
                if Path::new(&normalized).is_dir() {
                    Ok(())
                } else {
                    Err(format!("Not a directory: {}", normalized))
                }
            })
            .interact_text()?;
        Ok(PathBuf::from(normalize_input_path(&input)))
    }

    fn prompt_optional(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        let input: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        let trimmed = input.trim().to_string();
        Ok(if trimmed.is_empty() { None } else { Some(trimmed) })
    }

    fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    /// The stronger guard for irreversible same-root moves: the literal
    /// word must be typed out.
    fn confirm_typed_yes(&self, prompt: &str) -> anyhow::Result<bool> {
        let answer: String = Input::new()
            .with_prompt(format!("{} (type yes to continue)", prompt))
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }

    // ---- rename --------------------------------------------------------

    fn rename_menu(&self) -> anyhow::Result<()> {
        let choice = Select::new()
            .with_prompt("Film or digital photographs?")
            .items(&["Digital (per-file timestamps)", "Film (one date for the batch)", "Back"])
            .default(0)
            .interact()?;

        match choice {
            0 => self.rename_digital(),
            1 => self.rename_film(),
            _ => Ok(()),
        }
    }

    fn rename_digital(&self) -> anyhow::Result<()> {
        self.section("Rename Digital Photographs");

        let dir = self.prompt_directory("Folder path")?;
        let recursive = self.confirm("Include subdirectories?", false)?;
        let include_raw = self.confirm("Include RAW files?", false)?;
        let include_video = self.confirm("Include videos?", false)?;
        let suffix = self.prompt_optional("Custom suffix (blank for none)")?;
        let override_date = if self.confirm("Use custom date?", false)? {
            self.prompt_optional("Date (YYYYMMDD, YYYYMM, or YYYY)")?
        } else {
            None
        };

        let options = rename::DigitalOptions {
            recursive,
            include_raw,
            include_video,
            suffix,
            override_date,
        };
        let reader = MediaMetadataReader;
        let plan = rename::plan_digital(&dir, &self.config, &options, &reader)?;
        self.preview_and_apply(plan)
    }

    fn rename_film(&self) -> anyhow::Result<()> {
        self.section("Rename Film Photographs");

        let dir = self.prompt_directory("Folder path")?;
        let recursive = self.confirm("Include subdirectories?", false)?;
        let include_raw = self.confirm("Include RAW files?", false)?;
        let suffix = self.prompt_optional("Custom suffix (blank for none)")?;

        let date_literal: String = Input::new()
            .with_prompt("Date for all files (YYYYMMDD, YYYYMM, or YYYY)")
            .validate_with(|raw: &String| -> Result<(), &str> {
                if rename::is_valid_batch_date(raw.trim()) {
                    Ok(())
                } else {
                    Err("Invalid date. Use YYYYMMDD, YYYYMM, or YYYY")
                }
            })
            .interact_text()?;

        let options = rename::FilmOptions {
            recursive,
            include_raw,
            date_literal: date_literal.trim().to_string(),
            suffix,
        };
        let plan = rename::plan_film(&dir, &self.config, &options)?;
        self.preview_and_apply(plan)
    }

    fn preview_and_apply(&self, plan: rename::RenamePlan) -> anyhow::Result<()> {
        if plan.entries.is_empty() {
            println!(
                "{} Nothing to rename ({} already canonical)",
                style("·").dim(),
                plan.unchanged
            );
            return Ok(());
        }

        println!("\nPlanned renames:");
        for entry in &plan.entries {
            println!(
                "  {} {} {}",
                style(entry.source_name()).dim(),
                style("->").cyan(),
                entry.target_name
            );
        }
        if plan.unchanged > 0 {
            println!("  ({} already canonical, left alone)", plan.unchanged);
        }

        if !self.confirm("\nProceed with renaming?", false)? {
            println!("{}", style("Aborted.").yellow());
            return Ok(());
        }

        let report = rename::apply(&plan);
        println!(
            "{} Renamed {} of {} files",
            style("✓").green().bold(),
            report.renamed,
            plan.entries.len()
        );
        for (path, cause) in &report.failed {
            println!(
                "  {} {}: {}",
                style("✗").red(),
                path.display(),
                style(cause).dim()
            );
        }
        Ok(())
    }

    // ---- burn-in -------------------------------------------------------

    fn burn_in_menu(&self) -> anyhow::Result<()> {
        let choice = Select::new()
            .with_prompt("Burn captions into photos or videos?")
            .items(&["Photos", "Videos", "Back"])
            .default(0)
            .interact()?;

        match choice {
            0 => self.burn_in(CategoryFilter::images(), false),
            1 => self.burn_in(CategoryFilter::videos(), true),
            _ => Ok(()),
        }
    }

    fn burn_in(&self, filter: CategoryFilter, video: bool) -> anyhow::Result<()> {
        self.section(if video {
            "Burn Captions into Videos"
        } else {
            "Burn Captions into Photographs"
        });

        let source: String = Input::new()
            .with_prompt("Path to file or folder")
            .validate_with(|raw: &String| -> Result<(), String> {
                let normalized = normalize_input_path(raw);
                if Path::new(&normalized).exists() {
                    Ok(())
                } else {
                    Err(format!("Path not found: {}", normalized))
                }
            })
            .interact_text()?;
        let source = PathBuf::from(normalize_input_path(&source));

        let output = self.prompt_optional("Output path (blank to overwrite originals)")?;
        let output = output.map(|o| PathBuf::from(normalize_input_path(&o)));

        let per_file_text = self.confirm("Add a caption to each file individually?", false)?;
        let shared_text = if per_file_text {
            None
        } else {
            self.prompt_optional("Caption text for all files (blank for date only)")?
        };
        let custom_date = if self.confirm("Use custom date?", false)? {
            self.prompt_optional("Date (YYYYMMDD, YYYYMM, or YYYY)")?
        } else {
            None
        };

        let targets: Vec<MediaFile> = if source.is_dir() {
            let recursive = self.confirm("Include subdirectories?", false)?;
            media::scan_directory(&source, &self.config, filter, recursive)?
        } else {
            match MediaFile::from_path(&source, &self.config, filter) {
                Some(file) => vec![file],
                None => {
                    println!(
                        "{} File is not a supported {} format: {}",
                        style("✗").red(),
                        if video { "video" } else { "image" },
                        source.display()
                    );
                    return Ok(());
                }
            }
        };

        if targets.is_empty() {
            println!("{} No matching files under {}", style("·").dim(), source.display());
            return Ok(());
        }

        if let Some(folder) = &output {
            fs::create_dir_all(folder)?;
        }

        let reader = MediaMetadataReader;
        let mut done = 0usize;
        let mut failed = 0usize;

        for file in &targets {
            let text = if per_file_text {
                self.prompt_optional(&format!("Caption for '{}' (blank for none)", file.file_name()))?
            } else {
                shared_text.clone()
            };

            let metadata = reader.read(file);
            let request = ResolveRequest::for_file(file, &metadata, custom_date.as_deref());
            let resolved = date::resolve(&request);
            let caption = overlay::caption(&resolved, text.as_deref());

            let out_path = match &output {
                Some(folder) if source.is_dir() || folder.is_dir() => {
                    folder.join(file.file_name())
                }
                Some(path) => path.clone(),
                None => file.path.clone(),
            };

            let result = if video {
                overlay::video::burn_into_video(&file.path, &out_path, &caption, &self.config)
            } else {
                overlay::image::burn_into_image(&file.path, &out_path, &caption, &self.config)
            };

            match result {
                Ok(written) => {
                    println!(
                        "  {} {} {}",
                        style("✓").green(),
                        file.file_name(),
                        style(written.display()).dim()
                    );
                    done += 1;
                }
                Err(e) => {
                    println!(
                        "  {} {}: {}",
                        style("✗").red(),
                        file.file_name(),
                        style(e).dim()
                    );
                    failed += 1;
                }
            }
        }

        println!(
            "{} Captioned {} files, {} failed",
            style("✓").green().bold(),
            done,
            failed
        );
        Ok(())
    }

    // ---- metadata ------------------------------------------------------

    fn export_metadata(&self) -> anyhow::Result<()> {
        self.section("Export Image Metadata");

        let folder = self.prompt_directory("Folder path")?;
        let recursive = self.confirm("Include subdirectories?", false)?;
        let output_dir: String = Input::new()
            .with_prompt("Output directory")
            .interact_text()?;
        let output_dir = PathBuf::from(normalize_input_path(&output_dir));
        fs::create_dir_all(&output_dir)?;

        let format = Select::new()
            .with_prompt("Export format")
            .items(&["CSV", "JSON", "Both"])
            .default(2)
            .interact()?;

        let reader = MediaMetadataReader;
        let records = transfer::collect_records(&folder, &self.config, recursive, &reader)?;
        println!("{} Collected metadata for {} images", style("·").dim(), records.len());

        if format == 0 || format == 2 {
            let path = output_dir.join("metadata.csv");
            transfer::export_csv(&path, &records)?;
            println!("{} Metadata exported to {} (CSV)", style("✓").green(), path.display());
        }
        if format == 1 || format == 2 {
            let path = output_dir.join("metadata.json");
            transfer::export_json(&path, &records)?;
            println!("{} Metadata exported to {} (JSON)", style("✓").green(), path.display());
        }
        Ok(())
    }

    fn import_metadata(&self) -> anyhow::Result<()> {
        self.section("Rewrite Metadata from File");

        let meta_path: String = Input::new()
            .with_prompt("Path to metadata file (CSV or JSON)")
            .validate_with(|raw: &String| -> Result<(), String> {
                let normalized = normalize_input_path(raw);
                let path = Path::new(&normalized);
                if !path.is_file() {
                    return Err(format!("File not found: {}", normalized));
                }
                match path.extension().and_then(|e| e.to_str()) {
                    Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("json") => Ok(()),
                    _ => Err("File must be a .csv or .json".to_string()),
                }
            })
            .interact_text()?;
        let meta_path = PathBuf::from(normalize_input_path(&meta_path));

        println!("Found metadata file: {}", style(meta_path.display()).green());
        if !self.confirm("Is this the correct file?", true)? {
            println!("{}", style("Aborted.").yellow());
            return Ok(());
        }

        let records = transfer::load_records(&meta_path)?;
        println!("{} Loaded {} records", style("·").dim(), records.len());

        let folder = self.prompt_directory("Folder containing the images to update")?;
        let report = transfer::apply_records(&records, &folder)?;

        println!(
            "{} Updated {} files ({} not found, {} tag writes failed)",
            style("✓").green().bold(),
            report.updated,
            report.missing.len(),
            report.tag_failures
        );
        for (file, cause) in &report.failed {
            println!("  {} {}: {}", style("✗").red(), file, style(cause).dim());
        }
        Ok(())
    }

    // ---- restructure ---------------------------------------------------

    fn restructure(&self) -> anyhow::Result<()> {
        self.section("Restructure Photo/Video Library");

        let source = self.prompt_directory("Source photo/video directory")?;
        let files = media::scan_directory(&source, &self.config, CategoryFilter::all(), true)?;
        if files.is_empty() {
            println!("{} No media files under {}", style("·").dim(), source.display());
            return Ok(());
        }

        // Hard precondition: every file must carry a canonical name
        let (entries, nonconforming) = classify::partition_conforming(&files);
        if !nonconforming.is_empty() {
            println!(
                "{} The following files do not conform to the canonical naming scheme:",
                style("✗").red().bold()
            );
            for path in &nonconforming {
                println!("  {}", path.display());
            }
            println!("Please rename these files before restructuring.");
            return Err(crate::Error::NonconformingNames {
                count: nonconforming.len(),
            }
            .into());
        }

        let dest_input: String = Input::new()
            .with_prompt("Root folder for the restructured library")
            .validate_with(|raw: &String| -> Result<(), String> {
                let normalized = normalize_input_path(raw);
                if Path::new(&normalized).is_file() {
                    Err(format!("Not a directory: {}", normalized))
                } else {
                    Ok(())
                }
            })
            .interact_text()?;
        let dest = PathBuf::from(normalize_input_path(&dest_input));

        let same_root = dest.exists() && source.canonicalize()? == dest.canonicalize()?;
        let mode = if same_root {
            println!(
                "{}",
                style("Source and destination are the same directory; files will be MOVED in place.")
                    .yellow()
            );
            if !self.confirm_typed_yes("This cannot be undone.")? {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
            TransferMode::Move
        } else {
            println!(
                "{} All contents of {} will be deleted!",
                style("WARNING:").red().bold(),
                dest.display()
            );
            if !self.confirm("Proceed?", false)? || !self.confirm("Are you absolutely sure?", false)? {
                println!("{}", style("Aborted.").yellow());
                return Ok(());
            }
            restructure::clear_directory(&dest)?;
            TransferMode::Copy
        };

        // Group, then settle each large date gap with the user
        let groups = classify::group_by_suffix(entries);
        let mut resolved_groups = Vec::with_capacity(groups.len());
        for group in groups {
            let gaps = classify::detect_gaps(&group);
            let mut decisions = Vec::with_capacity(gaps.len());
            for gap in &gaps {
                let label = group.label.as_deref().unwrap_or("no suffix");
                println!(
                    "\nThese files in group '{}' are more than a year apart:",
                    style(label).cyan()
                );
                println!("  {} ({})", gap.prev_name, gap.prev_date);
                println!("  {} ({})", gap.next_name, gap.next_date);
                let merge = self.confirm("Should these be grouped together?", false)?;
                decisions.push(if merge { GapDecision::Merge } else { GapDecision::Split });
            }
            let partitions = classify::partition(&group, &decisions);
            resolved_groups.push((group, partitions));
        }

        let plan = restructure::build_plan(
            &resolved_groups,
            &dest,
            mode,
            self.config.event_threshold,
        );
        info!(transfers = plan.transfers.len(), ?mode, "Executing restructure plan");
        println!(
            "\n{} Transferring {} files...",
            style(">").cyan(),
            plan.transfers.len()
        );

        let report = restructure::execute(&plan, self.config.threads);
        let pruned = restructure::prune_media_free_dirs(&dest, &self.config)?;

        println!(
            "{} Transferred {} files ({} skipped, {} failed, {} empty folders pruned)",
            style("✓").green().bold(),
            report.transferred,
            report.skipped,
            report.failed.len(),
            pruned
        );
        for (path, cause) in &report.failed {
            println!("  {} {}: {}", style("✗").red(), path.display(), style(cause).dim());
        }
        Ok(())
    }

    fn section(&self, title: &str) {
        println!("\n{}", style("═".repeat(50)).dim());
        println!("{:^50}", style(title).cyan().bold());
        println!("{}", style("═".repeat(50)).dim());
    }
}
