use async_recursion::async_recursion;

pub async fn create_temp_dir() -> anyhow::Result<std::path::PathBuf> {
    let mut idx = 0;
    loop {
        let tmp_dir =
            std::env::temp_dir().join(format!("tman_test{}_{}", std::process::id(), &idx));
        if let Err(error) = tokio::fs::create_dir(&tmp_dir).await {
            match error.kind() {
                std::io::ErrorKind::AlreadyExists => {
                    idx += 1;
                }
                _ => return Err(error.into()),
            }
        } else {
            return Ok(tmp_dir);
        }
    }
}

pub async fn setup_template_dir() -> anyhow::Result<std::path::PathBuf> {
    let tmp_dir = create_temp_dir().await?;
    // template
    // |- main.tex
    // |- DOT_gitignore
    // |- shared
    //    |- DOT_style.sty
    //    |- notes.txt
    //    |- style-link -> (absolute path) .../template/shared/DOT_style.sty
    //    |- extern-link -> (absolute path) <tmp_dir>/outside.txt
    tokio::fs::write(tmp_dir.join("outside.txt"), "outside")
        .await
        .unwrap();
    let template_path = tmp_dir.join("template");
    tokio::fs::create_dir(&template_path).await.unwrap();
    tokio::fs::write(template_path.join("main.tex"), "\\documentclass{article}\n")
        .await
        .unwrap();
    tokio::fs::write(template_path.join("DOT_gitignore"), "build/\n")
        .await
        .unwrap();
    let shared_path = template_path.join("shared");
    tokio::fs::create_dir(&shared_path).await.unwrap();
    tokio::fs::write(shared_path.join("DOT_style.sty"), "% style\n")
        .await
        .unwrap();
    tokio::fs::write(shared_path.join("notes.txt"), "notes\n")
        .await
        .unwrap();
    tokio::fs::symlink(
        shared_path.join("DOT_style.sty"),
        shared_path.join("style-link"),
    )
    .await
    .unwrap();
    tokio::fs::symlink(
        tmp_dir.join("outside.txt"),
        shared_path.join("extern-link"),
    )
    .await
    .unwrap();
    Ok(tmp_dir)
}

#[async_recursion]
pub async fn check_dirs_identical(
    src: &std::path::Path,
    dst: &std::path::Path,
) -> anyhow::Result<()> {
    let mut src_entries = tokio::fs::read_dir(src).await?;
    while let Some(src_entry) = src_entries.next_entry().await? {
        let src_entry_path = src_entry.path();
        let src_entry_name = src_entry_path.file_name().unwrap();
        let dst_entry_path = dst.join(src_entry_name);
        let src_md = tokio::fs::symlink_metadata(&src_entry_path).await?;
        let dst_md = tokio::fs::symlink_metadata(&dst_entry_path).await?;
        assert_eq!(src_md.is_file(), dst_md.is_file());
        assert_eq!(src_md.is_dir(), dst_md.is_dir());
        if src_md.is_file() {
            let src_contents = tokio::fs::read_to_string(&src_entry_path).await?;
            let dst_contents = tokio::fs::read_to_string(&dst_entry_path).await?;
            assert_eq!(src_contents, dst_contents);
        } else if src_md.is_dir() {
            check_dirs_identical(&src_entry_path, &dst_entry_path).await?;
        }
    }
    Ok(())
}
