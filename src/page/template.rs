// Built-in page template.

/// Page used when no template file is given. Carries every id the assembler fills in.
pub const BUILTIN_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Portfolio</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; background: #f7f9fc; color: #2c3e50; }
    header, section { max-width: 1100px; margin: 0 auto; padding: 24px; }
    .hero { display: flex; gap: 24px; align-items: center; }
    .hero img { width: 160px; height: 160px; border-radius: 50%; object-fit: cover; }
    .section-header { display: flex; gap: 12px; align-items: center; }
    .cache-badge { font-size: 12px; color: #6c7a89; }
    .portfolio-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 16px; }
    .portfolio-item { background: #fff; border-radius: 10px; padding: 16px; box-shadow: 0 2px 8px rgba(0,0,0,.06); }
    .project-header { display: flex; justify-content: space-between; align-items: baseline; }
    .project-language { color: #fff; font-size: 12px; padding: 2px 8px; border-radius: 10px; }
    .project-topic { display: inline-block; font-size: 11px; margin: 2px; padding: 2px 6px; background: #eef3fb; border-radius: 8px; }
    .project-stats { display: flex; gap: 12px; font-size: 13px; color: #6c7a89; }
    .image-placeholder { background: #f2f4f8; }
    .form-status.error { color: #e74c3c; }
    .form-status.success { color: #27ae60; }
    .modal { display: none; }
    .modal.show { display: block; }
  </style>
</head>
<body>
  <header class="hero">
    <img src="assets/profile.jpg" alt="Profile photo" data-placeholder>
    <div>
      <h1>Lok Adhithya G</h1>
      <p>Software developer</p>
      <a id="downloadResumeBtn" class="btn" href="#">Download Resume</a>
    </div>
  </header>

  <section id="portfolio">
    <div class="section-header">
      <h2>Projects</h2>
      <span id="cacheBadge" class="cache-badge"></span>
      <button id="refreshReposBtn" type="button">Refresh</button>
    </div>
    <div id="portfolioLoading" class="portfolio-loading">Loading repositories...</div>
    <div id="portfolioError" class="portfolio-error" hidden>
      <p>Could not load repositories right now.</p>
      <button id="retryReposBtn" type="button">Retry</button>
    </div>
    <div id="portfolioGrid" class="portfolio-grid" hidden></div>
  </section>

  <section id="contact">
    <h2>Contact</h2>
    <form id="contactForm">
      <input name="name" placeholder="Name">
      <input name="email" type="email" placeholder="Email">
      <input name="subject" placeholder="Subject">
      <textarea name="message" placeholder="Message"></textarea>
      <button id="submitBtn" type="submit">Send Message</button>
      <div id="formStatus" class="form-status" hidden></div>
    </form>
    <a id="downloadResumeBtn2" class="btn" href="#">Resume (PDF)</a>
  </section>

  <div id="downloadSuccessModal" class="modal">
    <p>Your resume download has started.</p>
  </div>
</body>
</html>
"##;
