//! Imports creator profiles from folders of images
//!
//! Every subfolder of the downloads directory becomes one creator: the folder
//! name is the username, the first two images become avatar and banner, and a
//! random selection of the rest become subscriber-only posts.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use fanhub_db::db::repositories::{
    FollowerMetaRepository, PostRepository, TierRepository, UserRepository,
};
use fanhub_db::{Database, Settings};
use fanhub_types::{Media, MediaType, Post, SubscriptionTier, User, VerificationStatus};

use crate::batch::BatchPlan;
use crate::error::OpsError;
use crate::generate::{
    in_range, new_id, platform_launch, random_email, random_instant, short_user_id,
};
use crate::pacing::Pause;
use crate::password::hash_password;

/// Lower-case extensions recognised as images
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Optional subfolder holding extra images
const IMAGES_SUBDIR: &str = "images";

/// Optional profile metadata next to the images
const PROFILE_FILE: &str = "profile.json";

struct TierSpec {
    name: &'static str,
    description: &'static str,
    /// Whole currency units, inclusive
    price: (u64, u64),
    months: (u64, u64),
}

const TIERS: [TierSpec; 3] = [
    TierSpec {
        name: "Basic",
        description: "Basic subscription with limited content",
        price: (5, 15),
        months: (1, 3),
    },
    TierSpec {
        name: "Premium",
        description: "Premium subscription with exclusive content",
        price: (16, 30),
        months: (1, 6),
    },
    TierSpec {
        name: "VIP",
        description: "VIP subscription with all content and special perks",
        price: (31, 50),
        months: (4, 12),
    },
];

#[derive(Debug, Clone, Copy)]
pub struct ImportPacing {
    pub between_folder_batches: Pause,
    pub between_posts: Pause,
}

impl Default for ImportPacing {
    fn default() -> Self {
        Self {
            between_folder_batches: Pause::secs(3),
            between_posts: Pause::millis(500),
        }
    }
}

impl ImportPacing {
    pub fn none() -> Self {
        Self {
            between_folder_batches: Pause::NONE,
            between_posts: Pause::NONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub downloads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub upload_app_id: String,
    pub password: String,
    pub bcrypt_cost: u32,
    /// Folders processed between pauses
    pub folder_batch: usize,
    pub posts_per_user: (u64, u64),
    pub follower_meta: (u64, u64),
    pub pacing: ImportPacing,
}

impl ImportOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            downloads_dir: settings.import.downloads_dir.clone(),
            public_dir: settings.import.public_dir.clone(),
            upload_app_id: settings.import.upload_app_id.clone(),
            password: settings.import.password.clone(),
            bcrypt_cost: settings.security.bcrypt_cost,
            folder_batch: 3,
            posts_per_user: (10, 50),
            follower_meta: (100, 500_000),
            pacing: ImportPacing::default(),
        }
    }

    fn media_dir(&self) -> PathBuf {
        self.public_dir.join("a").join(&self.upload_app_id)
    }

    fn url_for(&self, file_name: &str) -> String {
        format!("/a/{}/{}", self.upload_app_id, file_name)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Profile {
    display_name: Option<String>,
    bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOutcome {
    pub user_id: String,
    pub reused_user: bool,
    pub posts_created: usize,
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub total_folders: usize,
    pub imported: usize,
    pub failed: usize,
    pub reused_users: usize,
    pub posts_created: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn record_success(&mut self, outcome: &FolderOutcome) {
        self.imported += 1;
        self.posts_created += outcome.posts_created;
        if outcome.reused_user {
            self.reused_users += 1;
        }
    }

    fn record_failure(&mut self, error: String) {
        tracing::error!("{}", error);
        self.failed += 1;
        self.errors.push(error);
    }
}

/// Import every folder under the downloads directory
pub fn run<R: Rng + ?Sized>(db: &Database, rng: &mut R, opts: &ImportOptions) -> Result<ImportSummary> {
    if !opts.downloads_dir.is_dir() {
        return Err(OpsError::DownloadsDirMissing(opts.downloads_dir.clone()).into());
    }

    let folders = list_folders(&opts.downloads_dir)?;
    tracing::info!("Found {} user folders to process", folders.len());

    let media_dir = opts.media_dir();
    fs::create_dir_all(&media_dir)
        .with_context(|| format!("Failed to create media directory {}", media_dir.display()))?;

    let importer = Importer {
        users: UserRepository::new(db.pool.clone()),
        posts: PostRepository::new(db.pool.clone()),
        tiers: TierRepository::new(db.pool.clone()),
        meta: FollowerMetaRepository::new(db.pool.clone()),
        password_hash: hash_password(&opts.password, opts.bcrypt_cost)?,
        opts,
    };

    let mut summary = ImportSummary {
        total_folders: folders.len(),
        ..ImportSummary::default()
    };

    let plan = BatchPlan::new(folders.len(), opts.folder_batch);
    for (index, batch) in folders.chunks(plan.batch_size).enumerate() {
        tracing::info!("Processing batch {} of {}", index + 1, plan.batch_count());

        for folder in batch {
            match importer.import_folder(rng, folder) {
                Ok(outcome) => summary.record_success(&outcome),
                Err(e) => summary.record_failure(format!(
                    "Failed to process folder {}: {:#}",
                    folder.display(),
                    e
                )),
            }
        }

        tracing::info!(
            "Batch completed. Success: {}/{}",
            summary.imported,
            summary.imported + summary.failed
        );
        if !plan.is_last(index) {
            opts.pacing.between_folder_batches.wait();
        }
    }

    Ok(summary)
}

struct Importer<'a> {
    users: UserRepository,
    posts: PostRepository,
    tiers: TierRepository,
    meta: FollowerMetaRepository,
    password_hash: String,
    opts: &'a ImportOptions,
}

impl Importer<'_> {
    fn import_folder<R: Rng + ?Sized>(&self, rng: &mut R, folder: &Path) -> Result<FolderOutcome> {
        let username = folder_name(folder);
        tracing::info!("Processing user folder: {}", username);

        let (user, reused_user) = self.find_or_create_user(rng, folder, &username)?;

        let follower_count = in_range(rng, self.opts.follower_meta);
        if let Err(e) = self.meta.upsert(&user.id, follower_count) {
            tracing::warn!("Error updating follower count for {}: {:#}", username, e);
        }

        let images = collect_images(folder)?;
        if images.len() < 2 {
            return Err(OpsError::NotEnoughImages {
                folder: username,
                found: images.len(),
            }
            .into());
        }
        tracing::debug!("Processing {} images for user {}", images.len(), username);

        let avatar_url = self.copy_image(rng, &images[0])?;
        let banner_url = self.copy_image(rng, &images[1])?;
        self.users.update_images(&user.id, &avatar_url, &banner_url)?;

        self.create_tiers(rng, &user.id)?;

        let mut remaining = images[2..].to_vec();
        remaining.shuffle(rng);
        let wanted = usize::try_from(in_range(rng, self.opts.posts_per_user)).unwrap_or(usize::MAX);
        remaining.truncate(wanted);

        tracing::info!("Creating {} posts for user {}", remaining.len(), username);
        for (index, image) in remaining.iter().enumerate() {
            self.create_post(rng, &user.id, image)
                .with_context(|| format!("Failed to create post from {}", image.display()))?;
            if index + 1 < remaining.len() {
                self.opts.pacing.between_posts.wait();
            }
        }

        tracing::info!("Successfully processed user {} with {} posts", username, remaining.len());
        Ok(FolderOutcome {
            user_id: user.id,
            reused_user,
            posts_created: remaining.len(),
        })
    }

    fn find_or_create_user<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        folder: &Path,
        username: &str,
    ) -> Result<(User, bool)> {
        let email = random_email(rng, username);
        if let Some(existing) = self.users.find_by_username_or_email(username, &email)? {
            tracing::info!("User {} or email {} already exists. Skipping creation.", username, email);
            return Ok((existing, true));
        }

        let profile = read_profile(folder);
        let user = User {
            id: short_user_id(rng),
            username: username.to_string(),
            display_name: Some(profile.display_name.unwrap_or_else(|| username.to_string())),
            email,
            password_hash: self.password_hash.clone(),
            bio: profile.bio,
            avatar_url: None,
            banner_image_url: None,
            is_verified: true,
            verification_status: VerificationStatus::Approved,
            created_at: random_instant(rng, platform_launch(), Utc::now()),
        };
        self.users.create(&user)?;
        tracing::info!("User created successfully: {} (ID: {})", user.username, user.id);
        Ok((user, false))
    }

    fn create_tiers<R: Rng + ?Sized>(&self, rng: &mut R, creator_id: &str) -> Result<()> {
        for spec in &TIERS {
            let price = in_range(rng, spec.price);
            let months = in_range(rng, spec.months);
            let tier = SubscriptionTier {
                id: new_id(rng).to_string(),
                creator_id: creator_id.to_string(),
                name: spec.name.to_string(),
                description: spec.description.to_string(),
                price_cents: i64::try_from(price * 100)?,
                duration_months: u32::try_from(months)?,
                created_at: Utc::now(),
            };
            self.tiers.create(&tier)?;
        }
        tracing::debug!("Created {} subscription tiers for user {}", TIERS.len(), creator_id);
        Ok(())
    }

    fn create_post<R: Rng + ?Sized>(&self, rng: &mut R, user_id: &str, image: &Path) -> Result<()> {
        let content = read_description(image);
        let url = self.copy_image(rng, image)?;
        let now = Utc::now();

        let media = Media {
            id: new_id(rng).to_string(),
            url,
            media_type: MediaType::Image,
            created_at: now,
        };
        let post = Post {
            id: new_id(rng).to_string(),
            user_id: user_id.to_string(),
            content,
            is_public: false,
            created_at: now,
        };
        self.posts.create_with_media(&post, &media)?;
        tracing::debug!("Post created (ID: {})", post.id);
        Ok(())
    }

    /// Copy an image under a fresh name into the media directory and return its URL
    fn copy_image<R: Rng + ?Sized>(&self, rng: &mut R, source: &Path) -> Result<String> {
        let stem = new_id(rng);
        let file_name = match source.extension() {
            Some(ext) => format!("{}.{}", stem, ext.to_string_lossy()),
            None => stem.to_string(),
        };
        let destination = self.opts.media_dir().join(&file_name);
        fs::copy(source, &destination).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                destination.display()
            )
        })?;

        let url = self.opts.url_for(&file_name);
        tracing::debug!("Image processed: {} -> {}", source.display(), url);
        Ok(url)
    }
}

fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Subdirectories of `dir` in name order
fn list_folders(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                IMAGE_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
}

fn images_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if is_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

/// Images of a profile folder, merged with its `images/` subfolder
///
/// Subfolder images replace the top level ones when the folder itself has
/// fewer than two.
pub fn collect_images(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut images = images_in(folder)?;

    let subdir = folder.join(IMAGES_SUBDIR);
    if subdir.is_dir() {
        let extra = images_in(&subdir)?;
        if !extra.is_empty() {
            if images.len() < 2 {
                images = extra;
            } else {
                images.extend(extra);
                images.sort();
            }
        }
    }

    Ok(images)
}

/// Text of `<stem>_description.txt` next to the image or in its parent folder
pub fn read_description(image: &Path) -> String {
    let Some(stem) = image.file_stem() else {
        return String::new();
    };
    let file_name = format!("{}_description.txt", stem.to_string_lossy());

    let dir = image.parent();
    let candidates = [
        dir.map(|d| d.join(&file_name)),
        dir.and_then(Path::parent).map(|d| d.join(&file_name)),
    ];

    for path in candidates.into_iter().flatten() {
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(text) => return text.trim().to_string(),
            Err(e) => {
                tracing::warn!("Error reading description {}: {}", path.display(), e);
                return String::new();
            }
        }
    }

    String::new()
}

fn read_profile(folder: &Path) -> Profile {
    let path = folder.join(PROFILE_FILE);
    if !path.is_file() {
        return Profile::default();
    }
    match fs::read_to_string(&path)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
    {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!("Ignoring unreadable {}: {:#}", path.display(), e);
            Profile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self as fixture, rng, seeded_db};
    use tempfile::TempDir;

    fn touch(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    fn options(root: &TempDir) -> ImportOptions {
        ImportOptions {
            downloads_dir: root.path().join("downloads"),
            public_dir: root.path().join("public"),
            upload_app_id: "test-app".to_string(),
            password: "trigun1".to_string(),
            bcrypt_cost: 4,
            folder_batch: 2,
            posts_per_user: (10, 50),
            follower_meta: (100, 500_000),
            pacing: ImportPacing::none(),
        }
    }

    #[test]
    fn test_collect_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.PNG"), "img");
        touch(&dir.path().join("a.jpg"), "img");
        touch(&dir.path().join("notes.txt"), "text");
        touch(&dir.path().join("a_description.txt"), "text");
        fs::create_dir_all(dir.path().join("folder.jpg")).unwrap();

        let names: Vec<String> = collect_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| folder_name(p))
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_images_subfolder_replaces_sparse_folder() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("cover.jpg"), "img");
        touch(&dir.path().join("images/x.webp"), "img");
        touch(&dir.path().join("images/y.gif"), "img");

        let images = collect_images(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|p| p.parent().unwrap().ends_with("images")));
    }

    #[test]
    fn test_images_subfolder_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.jpg"), "img");
        touch(&dir.path().join("b.jpg"), "img");
        touch(&dir.path().join("images/c.jpg"), "img");

        let images = collect_images(dir.path()).unwrap();
        assert_eq!(images.len(), 3);
        let mut sorted = images.clone();
        sorted.sort();
        assert_eq!(images, sorted);
    }

    #[test]
    fn test_read_description_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("images/sunset.jpg");
        touch(&image, "img");
        assert_eq!(read_description(&image), "");

        touch(&dir.path().join("sunset_description.txt"), "  from parent \n");
        assert_eq!(read_description(&image), "from parent");

        touch(&dir.path().join("images/sunset_description.txt"), "next to image\n");
        assert_eq!(read_description(&image), "next to image");
    }

    #[test]
    fn test_missing_downloads_dir() {
        let root = tempfile::tempdir().unwrap();
        let db = seeded_db();
        let err = run(&db, &mut rng(31), &options(&root)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OpsError>(),
            Some(OpsError::DownloadsDirMissing(_))
        ));
    }

    #[test]
    fn test_import_folders() {
        let root = tempfile::tempdir().unwrap();
        let opts = options(&root);
        let downloads = &opts.downloads_dir;

        // New creator with a profile and two post images
        touch(&downloads.join("newbie/1.jpg"), "avatar");
        touch(&downloads.join("newbie/2.png"), "banner");
        touch(&downloads.join("newbie/3.jpg"), "post");
        touch(&downloads.join("newbie/3_description.txt"), "Golden hour\n");
        touch(&downloads.join("newbie/images/4.jpeg"), "post");
        touch(
            &downloads.join("newbie/profile.json"),
            r#"{"display_name": "New Bie", "bio": "Hello there"}"#,
        );
        // Not enough images
        touch(&downloads.join("sparse/only.jpg"), "img");
        // Existing user, matched case-insensitively
        touch(&downloads.join("Ben/a.jpg"), "img");
        touch(&downloads.join("Ben/b.jpg"), "img");

        let db = seeded_db();
        let summary = run(&db, &mut rng(32), &opts).unwrap();

        assert_eq!(summary.total_folders, 3);
        assert_eq!(summary.imported, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reused_users, 1);
        assert_eq!(summary.posts_created, 2);
        assert!(summary.errors[0].contains("sparse"));

        let users = UserRepository::new(db.pool.clone());
        let newbie = users
            .find_by_username_or_email("newbie", "-")
            .unwrap()
            .expect("imported user");
        assert_eq!(newbie.display_name.as_deref(), Some("New Bie"));
        assert_eq!(newbie.bio.as_deref(), Some("Hello there"));
        assert_eq!(newbie.verification_status, VerificationStatus::Approved);
        assert!(bcrypt::verify("trigun1", &newbie.password_hash).unwrap());

        let avatar = newbie.avatar_url.expect("avatar");
        assert!(avatar.starts_with("/a/test-app/") && avatar.ends_with(".jpg"));
        let stored = opts.media_dir().join(avatar.trim_start_matches("/a/test-app/"));
        assert_eq!(fs::read_to_string(stored).unwrap(), "avatar");

        let tiers = TierRepository::new(db.pool.clone()).list_for_creator(&newbie.id).unwrap();
        let names: Vec<&str> = tiers.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Basic", "Premium", "VIP"]);
        assert!((500..=1500).contains(&tiers[0].price_cents));
        assert!((4..=12).contains(&tiers[2].duration_months));

        let posts = PostRepository::new(db.pool.clone()).list_for_user(&newbie.id).unwrap();
        assert_eq!(posts.len(), 2);
        let contents: Vec<String> = posts
            .iter()
            .map(|p| {
                PostRepository::new(db.pool.clone())
                    .get_by_id(&p.id)
                    .unwrap()
                    .unwrap()
                    .content
            })
            .collect();
        assert!(contents.contains(&"Golden hour".to_string()));

        // ben keeps his account and gets new images
        let ben = users.get_by_id(fixture::BEN).unwrap().unwrap();
        assert!(ben.avatar_url.is_some());
        assert!(FollowerMetaRepository::new(db.pool.clone())
            .get(fixture::BEN)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_import_is_reproducible_for_a_seed() {
        let import_once = || {
            let root = tempfile::tempdir().unwrap();
            let opts = options(&root);
            touch(&opts.downloads_dir.join("newbie/1.jpg"), "avatar");
            touch(&opts.downloads_dir.join("newbie/2.png"), "banner");
            touch(&opts.downloads_dir.join("newbie/3.jpg"), "post");
            touch(&opts.downloads_dir.join("newbie/4.gif"), "post");

            let db = seeded_db();
            run(&db, &mut rng(33), &opts).unwrap();

            let user = UserRepository::new(db.pool.clone())
                .find_by_username_or_email("newbie", "-")
                .unwrap()
                .expect("imported user");
            let mut post_ids: Vec<String> = PostRepository::new(db.pool.clone())
                .list_for_user(&user.id)
                .unwrap()
                .into_iter()
                .map(|p| p.id)
                .collect();
            post_ids.sort();
            (user.id, user.avatar_url, user.banner_image_url, post_ids)
        };

        let first = import_once();
        assert_eq!(first.3.len(), 2);
        assert_eq!(first, import_once());
    }
}
