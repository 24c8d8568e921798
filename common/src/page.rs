/// Landing page. Served verbatim for every request that is not a
/// temperature poll; its script fetches `/temps` on load and every 5 s.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Temperature Monitor</title>
  <style>
    *{margin:0;padding:0;box-sizing:border-box}
    body{font-family:Arial,sans-serif;display:flex;justify-content:center;align-items:center;
      min-height:100vh;background:linear-gradient(135deg,#4a90e2,#9013fe);color:#fff;text-align:center}
    .container{background:rgba(255,255,255,.1);padding:40px;border-radius:15px;width:90%;max-width:500px;
      box-shadow:0 8px 20px rgba(0,0,0,.2);backdrop-filter:blur(8px)}
    h1{font-size:2.5rem;margin-bottom:20px;font-weight:600}
    #temps{font-size:1.2rem;line-height:1.6}
    .device{background:rgba(255,255,255,.2);padding:15px;margin:10px 0;border-radius:10px;transition:background .3s ease}
    .device:hover{background:rgba(255,255,255,.3)}
    footer{margin-top:20px;font-size:.9rem;color:#ddd}
    .loader{display:inline-block;width:40px;height:40px;border:4px solid rgba(255,255,255,.3);border-radius:50%;
      border-top-color:#fff;animation:spin 1s ease infinite;margin-top:10px}
    @keyframes spin{to{transform:rotate(360deg)}}
  </style>
  <script>
    function fetchTemperatures(){
      fetch('/temps')
        .then((r)=>r.text())
        .then((data)=>{document.getElementById('temps').innerHTML=data;})
        .catch((err)=>console.error('Error fetching temperatures:',err));
    }
    setInterval(fetchTemperatures,5000);
    window.onload=fetchTemperatures;
  </script>
</head>
<body>
  <div class="container">
    <h1>Temperature Monitor</h1>
    <div id="temps">
      <div class="loader"></div>
      <p>Loading temperatures...</p>
    </div>
    <footer>One-wire temperature node</footer>
  </div>
</body>
</html>
"#;
